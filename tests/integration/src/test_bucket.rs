//! Bucket lifecycle integration tests.

#[cfg(test)]
mod tests {
    use ruststack_iobuf::IoBuf;
    use ruststack_s3_client::S3Client;

    use crate::{live_context, unique_name};

    #[test]
    #[ignore = "requires live endpoint"]
    fn test_should_create_stat_and_delete_bucket() {
        let mut ctx = live_context().expect("credentials");
        let bucket = unique_name("bucket");
        let mut client = S3Client::new(&mut ctx);

        let mut buf = IoBuf::new();
        client.create_bucket(&mut buf, &bucket).expect("create_bucket");
        assert_eq!(buf.status_code(), Some(200), "{:?}", buf.status_text());

        let mut stat = IoBuf::new();
        client.stat_bucket(&mut stat, &bucket).expect("stat_bucket");
        assert_eq!(stat.status_code(), Some(200));

        let mut del = IoBuf::new();
        client.delete_bucket(&mut del, &bucket).expect("delete_bucket");
        assert_eq!(del.status_code(), Some(204));

        let mut gone = IoBuf::new();
        client.stat_bucket(&mut gone, &bucket).expect("stat_bucket");
        assert_eq!(gone.status_code(), Some(404));
    }
}
