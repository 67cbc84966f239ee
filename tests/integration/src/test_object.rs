//! Object round-trip integration tests.

#[cfg(test)]
mod tests {
    use std::io::Write;

    use ruststack_iobuf::IoBuf;
    use ruststack_s3_client::{S3Client, etag_matches_file};

    use crate::{live_context, unique_name};

    #[test]
    #[ignore = "requires live endpoint"]
    fn test_should_put_and_get_object_with_metadata() {
        let mut ctx = live_context().expect("credentials");
        let bucket = unique_name("objects");
        let mut client = S3Client::new(&mut ctx);
        client
            .create_bucket(&mut IoBuf::new(), &bucket)
            .expect("create_bucket");

        client.context().set_mime_type(Some("text/plain"));
        let mut put = IoBuf::new();
        put.append_str("hello, ruststack!").unwrap();
        put.metadata_mut().set("owner", "integration");
        client.put(&mut put, "greeting.txt").expect("put");
        assert_eq!(put.status_code(), Some(200));

        let mut get = IoBuf::new();
        client.get(&mut get, "greeting.txt").expect("get");
        assert_eq!(get.status_code(), Some(200));
        assert_eq!(get.to_vec(), b"hello, ruststack!");
        assert_eq!(get.metadata_value("owner"), Some("integration"));
        assert_eq!(get.content_length(), 17);

        client.context().set_byte_range(7, 9).expect("byte range");
        let mut part = IoBuf::new();
        client.get(&mut part, "greeting.txt").expect("ranged get");
        assert_eq!(part.status_code(), Some(206));
        assert_eq!(part.to_vec(), b"ruststack");

        client.delete(&mut IoBuf::new(), "greeting.txt").expect("delete");
        client
            .delete_bucket(&mut IoBuf::new(), &bucket)
            .expect("delete_bucket");
    }

    #[test]
    #[ignore = "requires live endpoint"]
    fn test_should_upload_file_and_match_etag() {
        let mut ctx = live_context().expect("credentials");
        let bucket = unique_name("files");
        let mut client = S3Client::new(&mut ctx);
        client
            .create_bucket(&mut IoBuf::new(), &bucket)
            .expect("create_bucket");

        let mut src = tempfile::NamedTempFile::new().unwrap();
        src.write_all(&vec![b'x'; 200_000]).unwrap();
        let mut put = IoBuf::new();
        client
            .put_with(&mut put, "blob.bin", Some(src.path()), None)
            .expect("put_with");
        assert!(etag_matches_file(&put, src.path()).unwrap());

        let dst = tempfile::NamedTempFile::new().unwrap();
        let mut get = IoBuf::new();
        client
            .get_with(&mut get, "blob.bin", Some(dst.path()))
            .expect("get_with");
        assert_eq!(std::fs::metadata(dst.path()).unwrap().len(), 200_000);

        client.delete(&mut IoBuf::new(), "blob.bin").expect("delete");
        client
            .delete_bucket(&mut IoBuf::new(), &bucket)
            .expect("delete_bucket");
    }
}
