mod product_handler;

pub use product_handler::{
    __path_create_product, __path_delete_product, __path_get_product, __path_list_products,
    __path_update_product, create_product, delete_product, get_product, list_products,
    update_product,
};
