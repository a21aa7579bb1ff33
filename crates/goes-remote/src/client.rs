//! S3 client construction for the public, unsigned `noaa-goes*` buckets.

use aws_config::{BehaviorVersion, Region};
use aws_smithy_types::timeout::TimeoutConfig;

use crate::config::RemoteConfig;

/// Builds an S3 client for anonymous, unsigned requests, with connect/read
/// timeouts from `config`.
///
/// Timeouts are configured once and the client is reused across every
/// request rather than rebuilt per call.
pub async fn build_client(config: &RemoteConfig) -> aws_sdk_s3::Client {
    let timeout_config = TimeoutConfig::builder()
        .connect_timeout(config.connect_timeout)
        .read_timeout(config.read_timeout)
        .build();

    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .no_credentials()
        .timeout_config(timeout_config)
        .load()
        .await;

    aws_sdk_s3::Client::new(&sdk_config)
}
