//! Queue integration tests.

#[cfg(test)]
mod tests {
    use ruststack_iobuf::IoBuf;
    use ruststack_sqs_client::SqsClient;

    use crate::{live_context, unique_name};

    #[test]
    #[ignore = "requires live endpoint"]
    fn test_should_send_receive_and_delete_message() {
        let mut ctx = live_context().expect("credentials");
        let name = unique_name("queue");
        let mut client = SqsClient::new(&mut ctx);

        let mut created = IoBuf::new();
        client.create_queue(&mut created, &name).expect("create_queue");
        assert_eq!(created.status_code(), Some(200));

        let mut urls = IoBuf::new();
        let found = client.list_queues(&mut urls, &name).expect("list_queues");
        assert_eq!(found, 1);
        let listed = String::from_utf8(urls.to_vec()).unwrap();
        let queue_url = listed.trim_end();

        client
            .set_visibility_timeout(&mut IoBuf::new(), queue_url, 5)
            .expect("set_visibility_timeout");
        let attributes = client
            .get_queue_attributes(&mut IoBuf::new(), queue_url)
            .expect("get_queue_attributes");
        assert_eq!(attributes.visibility_timeout, Some(5));

        client
            .send_message(&mut IoBuf::new(), queue_url, "line one\nline two")
            .expect("send_message");

        let mut body = IoBuf::new();
        let receipt = client
            .receive_message(&mut body, queue_url)
            .expect("receive_message")
            .expect("a message");
        assert_eq!(body.to_vec(), b"line one\nline two");

        let mut deleted = IoBuf::new();
        client
            .delete_message(&mut deleted, queue_url, &receipt)
            .expect("delete_message");
        assert_eq!(deleted.status_code(), Some(200));
    }
}
