use async_trait::async_trait;
use aws_sdk_ec2::types::Filter;
use log::{debug, warn};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::{Error, Result};

/// Filters pinning down the Amazon Linux 2 base images our custom images
/// derive from. Everything is fixed except the kernel version embedded in
/// the name.
const FILTERS: &[(&str, &str)] = &[
    ("name", "amzn2-ami-kernel-*-hvm-*"),
    ("architecture", "x86_64"),
    ("owner-alias", "amazon"),
    ("state", "available"),
    ("virtualization-type", "hvm"),
    ("root-device-type", "ebs"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub id: String,
    pub created_at: OffsetDateTime,
}

/// Returns the record with the greatest creation timestamp. Ties resolve to
/// the earliest record in the slice, so the catalog's response order decides.
pub fn latest(images: &[ImageRecord]) -> Option<&ImageRecord> {
    images.iter().reduce(|latest, image| {
        if image.created_at > latest.created_at {
            image
        } else {
            latest
        }
    })
}

#[async_trait]
pub trait ImageCatalog {
    /// Returns the id of the most recently created image matching the base
    /// image filters.
    async fn find_latest_available_image(&self) -> Result<String>;
}

pub struct Ec2Catalog {
    client: aws_sdk_ec2::Client,
}

impl Ec2Catalog {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_ec2::Client::new(config),
        }
    }
}

#[async_trait]
impl ImageCatalog for Ec2Catalog {
    async fn find_latest_available_image(&self) -> Result<String> {
        let mut request = self.client.describe_images();
        for &(name, value) in FILTERS {
            request = request.filters(Filter::builder().name(name).values(value).build());
        }

        let response = request.send().await.map_err(|error| Error::ImageLookup {
            source: error.into(),
        })?;

        let mut images = Vec::new();
        for image in response.images.unwrap_or_default() {
            let (Some(id), Some(created)) = (image.image_id, image.creation_date) else {
                continue;
            };
            match OffsetDateTime::parse(&created, &Rfc3339) {
                Ok(created_at) => images.push(ImageRecord { id, created_at }),
                Err(error) => {
                    warn!("skipping image {id} with unparseable creation date {created:?}: {error}")
                }
            }
        }

        debug!(
            "image catalog returned {count} candidate images",
            count = images.len()
        );

        latest(&images)
            .map(|image| image.id.clone())
            .ok_or(Error::NoMatchingImage)
    }
}
