//! AWS-backed implementations of the rackwatch sink traits: S3 object
//! storage, SNS alert notifications, and CloudWatch counter metrics.

mod cloudwatch;
mod s3;
mod sns;

pub use cloudwatch::CloudWatchMetrics;
pub use s3::{S3Config, S3ObjectStore};
pub use sns::SnsNotifier;
