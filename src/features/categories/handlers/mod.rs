mod category_handler;

pub use category_handler::{
    __path_category_overview, __path_check_category_deletion, __path_create_category,
    __path_delete_category, __path_get_category, __path_get_category_by_slug,
    __path_list_categories, __path_update_category, category_overview, check_category_deletion,
    create_category, delete_category, get_category, get_category_by_slug, list_categories,
    update_category,
};
