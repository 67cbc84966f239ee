//! Bucket-level helpers.
//!
//! Each helper selects the bucket on the context (the selection persists
//! afterwards) and issues the object operation against the empty key.

use ruststack_client_core::ClientResult;
use ruststack_iobuf::IoBuf;

use crate::client::S3Client;

impl S3Client<'_> {
    /// Create `bucket` with an empty PUT.
    pub fn create_bucket(&mut self, buf: &mut IoBuf<'_>, bucket: &str) -> ClientResult<()> {
        self.context().set_bucket(Some(bucket));
        self.put(buf, "")
    }

    /// Delete `bucket`.
    pub fn delete_bucket(&mut self, buf: &mut IoBuf<'_>, bucket: &str) -> ClientResult<()> {
        self.context().set_bucket(Some(bucket));
        self.delete(buf, "")
    }

    /// HEAD `bucket`; the status code tells whether it exists.
    pub fn stat_bucket(&mut self, buf: &mut IoBuf<'_>, bucket: &str) -> ClientResult<()> {
        self.context().set_bucket(Some(bucket));
        self.head(buf, "")
    }

    /// HEAD `object` in `bucket`.
    pub fn stat_object(
        &mut self,
        buf: &mut IoBuf<'_>,
        bucket: &str,
        object: &str,
    ) -> ClientResult<()> {
        self.context().set_bucket(Some(bucket));
        self.head(buf, object)
    }
}
