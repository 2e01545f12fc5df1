//! MinIO/S3-compatible media store
//!
//! Product images are written below `{public_prefix}/{image_folder}/` and the
//! bucket is given an anonymous read policy on the public prefix, so the URL
//! returned from an upload can be handed straight to browsers.

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, Url};
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::config::StorageConfig;
use crate::core::error::AppError;
use crate::modules::storage::media_store::{image_dimensions, image_format, MediaStore, StoredMedia};

type HmacSha256 = Hmac<Sha256>;

pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    public_endpoint: String,
    public_prefix: String,
    image_folder: String,
    access_key: String,
    secret_key: String,
    region_name: String,
    /// Used for the bucket policy call, which rust-s3 does not cover
    http_client: Client,
}

impl MinIOClient {
    /// Connect to the bucket, creating it and its public read policy if needed
    pub async fn new(config: StorageConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create storage credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to open bucket: {}", e)))?;
        bucket.set_path_style();

        let http_client = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let client = Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
            public_endpoint: config.public_endpoint,
            public_prefix: config.public_prefix,
            image_folder: config.image_folder,
            access_key: config.access_key,
            secret_key: config.secret_key,
            region_name: config.region,
            http_client,
        };

        client.ensure_bucket_exists().await;
        client.set_public_read_policy().await;

        info!(
            "Media store ready: endpoint={}, bucket={}, image prefix={}",
            client.endpoint,
            client.bucket.name(),
            client.object_key_prefix()
        );

        Ok(client)
    }

    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    /// Key prefix shared by all product images, e.g. "public/products"
    fn object_key_prefix(&self) -> String {
        format!("{}/{}", self.public_prefix, self.image_folder)
    }

    fn object_key(&self, extension: &str) -> String {
        format!("{}/{}.{}", self.object_key_prefix(), Uuid::now_v7(), extension)
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_endpoint, self.bucket.name(), key)
    }

    /// Create the bucket unless it already exists. Failures are logged only,
    /// the bucket may have been provisioned out of band.
    async fn ensure_bucket_exists(&self) {
        let result = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match result {
            Ok(_) => info!("Bucket '{}' created", self.bucket.name()),
            Err(e) => {
                let message = e.to_string();
                if message.contains("BucketAlreadyOwnedByYou")
                    || message.contains("BucketAlreadyExists")
                    || message.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        message
                    );
                }
            }
        }
    }

    /// Grant anonymous `s3:GetObject` on the public prefix
    async fn set_public_read_policy(&self) {
        let bucket_name = self.bucket.name();
        let policy = json!({
            "Version": "2012-10-17",
            "Statement": [{
                "Effect": "Allow",
                "Principal": {"AWS": "*"},
                "Action": ["s3:GetObject"],
                "Resource": [format!("arn:aws:s3:::{}/{}/*", bucket_name, self.public_prefix)]
            }]
        })
        .to_string();

        match self.put_bucket_policy(&bucket_name, &policy).await {
            Ok(()) => info!(
                "Public read policy set for {}/{}/*",
                bucket_name, self.public_prefix
            ),
            Err(e) => warn!(
                "Failed to set bucket policy for '{}': {}. Image URLs will not be public until \
                 the policy is set manually (mc anonymous set download <alias>/{}/{})",
                bucket_name, e, bucket_name, self.public_prefix
            ),
        }
    }

    /// PUT ?policy signed with AWS Signature v4
    async fn put_bucket_policy(&self, bucket_name: &str, policy: &str) -> Result<(), AppError> {
        let now = Utc::now();
        let date_stamp = now.format("%Y%m%d").to_string();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();

        let endpoint_url = Url::parse(&self.endpoint)
            .map_err(|e| AppError::Internal(format!("Invalid endpoint URL: {}", e)))?;
        let host = endpoint_url
            .host_str()
            .ok_or_else(|| AppError::Internal("Endpoint URL has no host".to_string()))?;
        let host_header = match endpoint_url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let payload_hash = hex::encode(Sha256::digest(policy.as_bytes()));
        let signed_headers = "host;x-amz-content-sha256;x-amz-date";
        let canonical_request = format!(
            "PUT\n/{}\npolicy=\nhost:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n\n{}\n{}",
            bucket_name, host_header, payload_hash, amz_date, signed_headers, payload_hash
        );

        let credential_scope = format!("{}/{}/s3/aws4_request", date_stamp, self.region_name);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date,
            credential_scope,
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );
        let signature = sigv4_signature(
            &self.secret_key,
            &date_stamp,
            &self.region_name,
            &string_to_sign,
        )?;

        let authorization = format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            self.access_key, credential_scope, signed_headers, signature
        );

        let response = self
            .http_client
            .put(format!("{}/{}?policy", self.endpoint, bucket_name))
            .header("Host", &host_header)
            .header("x-amz-date", &amz_date)
            .header("x-amz-content-sha256", &payload_hash)
            .header("Authorization", &authorization)
            .header("Content-Type", "application/json")
            .body(policy.to_string())
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to send policy request: {}", e)))?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Internal(format!(
            "Failed to set bucket policy: {} - {}",
            status, body
        )))
    }
}

/// Derive the SigV4 signing key for S3 and sign `string_to_sign`
fn sigv4_signature(
    secret_key: &str,
    date_stamp: &str,
    region: &str,
    string_to_sign: &str,
) -> Result<String, AppError> {
    let k_date = hmac_sha256(
        format!("AWS4{}", secret_key).as_bytes(),
        date_stamp.as_bytes(),
    )?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, b"s3")?;
    let k_signing = hmac_sha256(&k_service, b"aws4_request")?;
    Ok(hex::encode(hmac_sha256(&k_signing, string_to_sign.as_bytes())?))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, AppError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::Internal(format!("HMAC key error: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

#[async_trait]
impl MediaStore for MinIOClient {
    async fn upload(&self, data: Vec<u8>, content_type: &str) -> Result<StoredMedia, AppError> {
        let format = image_format(content_type).ok_or_else(|| {
            AppError::BadRequest(format!("Unsupported image type '{}'", content_type))
        })?;
        let key = self.object_key(format);
        let dimensions = image_dimensions(&data);
        let size = data.len() as u64;

        self.bucket
            .put_object_with_content_type(&key, &data, content_type)
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Failed to upload image '{}': {}", key, e))
            })?;

        debug!("Uploaded '{}' ({} bytes) to bucket '{}'", key, size, self.bucket.name());

        Ok(StoredMedia {
            url: self.public_url(&key),
            id: key,
            format: format.to_string(),
            width: dimensions.map(|(w, _)| w),
            height: dimensions.map(|(_, h)| h),
            size,
        })
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        // Only objects this store created are eligible for deletion
        if !id.starts_with(&format!("{}/", self.object_key_prefix())) {
            return Err(AppError::BadRequest(format!(
                "'{}' is not a product image key",
                id
            )));
        }

        self.bucket.delete_object(id).await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to delete image '{}': {}", id, e))
        })?;

        debug!("Deleted '{}' from bucket '{}'", id, self.bucket.name());
        Ok(())
    }
}
