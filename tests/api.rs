//! REST operations against a mock server.

use flowdock::{
    Content, Error, Flow, FlowdockClient, FlowsCreateOptions, FlowsListOptions,
    InboxCreateOptions, MessagesCreateOptions, MessagesListOptions, OrganizationUpdateOptions,
    UserUpdateOptions,
};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> FlowdockClient {
    FlowdockClient::builder()
        .rest_url(server.uri())
        .stream_url(server.uri())
        .access_token("test-token")
        .build()
        .unwrap()
}

fn flow_json() -> serde_json::Value {
    json!({
        "id": "acdcabbacd1234567890",
        "name": "My flow",
        "parameterized_name": "my-flow",
        "organization": { "id": 1, "parameterized_name": "org", "name": "Org" },
        "open": true,
        "joined": true,
        "unread_mentions": 0,
        "api_token": "flow-api-token",
        "url": "https://api.flowdock.com/flows/org/my-flow"
    })
}

#[tokio::test]
async fn test_flows_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flows"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([flow_json()])))
        .expect(1)
        .mount(&server)
        .await;

    let (flows, raw) = assert_ok!(client(&server).flows().list(false, None).await);

    assert_eq!(raw.status, 200);
    assert_eq!(flows.len(), 1);
    assert_eq!(flows[0].id.as_deref(), Some("acdcabbacd1234567890"));
    assert_eq!(flows[0].parameterized_name.as_deref(), Some("my-flow"));
    assert_eq!(
        flows[0]
            .organization
            .as_ref()
            .and_then(|o| o.parameterized_name.as_deref()),
        Some("org")
    );
}

#[tokio::test]
async fn test_flows_list_all_with_users() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flows/all"))
        .and(query_param("users", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([flow_json(), flow_json()])))
        .expect(1)
        .mount(&server)
        .await;

    let opts = FlowsListOptions { users: true };
    let (flows, _) = assert_ok!(client(&server).flows().list(true, Some(&opts)).await);
    assert_eq!(flows.len(), 2);
}

#[tokio::test]
async fn test_flows_get_and_find() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flows/org/my-flow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(flow_json()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flows/find"))
        .and(query_param("id", "acdcabbacd1234567890"))
        .respond_with(ResponseTemplate::new(200).set_body_json(flow_json()))
        .mount(&server)
        .await;

    let client = client(&server);
    let (by_name, _) = assert_ok!(client.flows().get("org", "my-flow").await);
    let (by_id, _) = assert_ok!(client.flows().get_by_id("acdcabbacd1234567890").await);

    assert_eq!(by_name, by_id);
    assert_eq!(by_name.api_token.as_deref(), Some("flow-api-token"));
}

#[tokio::test]
async fn test_flows_create() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/flows/org"))
        .and(body_string("name=flowname"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "new-flow",
            "name": "flowname",
            "parameterized_name": "flowname"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let opts = FlowsCreateOptions {
        name: "flowname".to_string(),
    };
    let (flow, _) = assert_ok!(client(&server).flows().create("org", &opts).await);
    assert_eq!(flow.name.as_deref(), Some("flowname"));
}

#[tokio::test]
async fn test_flows_update_sends_only_set_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/flows/org/my-flow"))
        .and(body_json(json!({ "open": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(flow_json()))
        .expect(1)
        .mount(&server)
        .await;

    let update = Flow {
        open: Some(true),
        ..Default::default()
    };
    let (flow, _) = assert_ok!(client(&server).flows().update("org", "my-flow", &update).await);
    assert_eq!(flow.open, Some(true));
}

#[tokio::test]
async fn test_messages_list_decodes_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flows/org/my-flow/messages"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "event": "message",
                "content": "Howdy-Doo @Jackie #awesome",
                "user": "18",
                "sent": 1385546251160i64,
                "tags": ["@Jackie", "awesome"]
            },
            {
                "id": 2,
                "event": "comment",
                "content": { "title": "Thread", "text": "a reply" },
                "user": "18"
            },
            {
                "id": 3,
                "event": "vcs",
                "content": {
                    "event": "push",
                    "repository": { "name": "flowdock-rs" },
                    "pusher": { "name": "alice" },
                    "compare": "https://github.com/example/compare/a...b"
                }
            },
            {
                "id": 4,
                "event": "action",
                "content": { "type": "add_people" }
            }
        ])))
        .mount(&server)
        .await;

    let opts = MessagesListOptions {
        limit: Some(2),
        ..Default::default()
    };
    let (messages, _) = assert_ok!(
        client(&server)
            .messages()
            .list("org", "my-flow", Some(&opts))
            .await
    );

    assert_eq!(messages.len(), 4);
    assert!(messages[0].has_tag("awesome"));
    assert_eq!(
        assert_ok!(messages[0].content()).to_string(),
        "Howdy-Doo @Jackie #awesome"
    );
    assert_eq!(assert_ok!(messages[1].content()).to_string(), "a reply");
    assert_eq!(
        assert_ok!(messages[2].content()).to_string(),
        "flowdock-rs: push by alice https://github.com/example/compare/a...b"
    );
    assert!(matches!(assert_ok!(messages[3].content()), Content::Raw(_)));
}

#[tokio::test]
async fn test_messages_create() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(body_string("event=message&content=Howdy-Doo+%40Jackie+%23awesome"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 3816534,
            "event": "message",
            "content": "Howdy-Doo @Jackie #awesome",
            "sent": 1385546251160i64
        })))
        .expect(1)
        .mount(&server)
        .await;

    let opts = MessagesCreateOptions {
        event: "message".to_string(),
        content: "Howdy-Doo @Jackie #awesome".to_string(),
        ..Default::default()
    };
    let (msg, raw) = assert_ok!(client(&server).messages().create(&opts).await);

    assert_eq!(raw.status, 201);
    assert_eq!(msg.id, Some(3816534));
}

#[tokio::test]
async fn test_messages_create_comment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/comments"))
        .and(body_string(
            "flow=flow-id&event=comment&content=nice&message=3816534&tags=review%2Cdone",
        ))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 3816535,
            "event": "comment",
            "content": { "title": "Thread", "text": "nice" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let opts = MessagesCreateOptions {
        flow: Some("flow-id".to_string()),
        event: "comment".to_string(),
        content: "nice".to_string(),
        message: Some(3816534),
        tags: vec!["review".to_string(), "done".to_string()],
        ..Default::default()
    };
    let (msg, _) = assert_ok!(client(&server).messages().create_comment(&opts).await);
    assert_eq!(assert_ok!(msg.content()).to_string(), "nice");
}

#[tokio::test]
async fn test_users() {
    let server = MockServer::start().await;
    let user = json!({ "id": 1, "nick": "Jackie", "name": "Jackie Example", "email": "j@example.com" });
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([user.clone()])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flows/org/my-flow/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([user.clone()])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user.clone()))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/users/1"))
        .and(body_json(json!({ "nick": "Jax" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "nick": "Jax" })))
        .expect(1)
        .mount(&server)
        .await;

    let users = client(&server).users();
    let (all, _) = assert_ok!(users.all().await);
    let (in_flow, _) = assert_ok!(users.list("org", "my-flow").await);
    let (one, _) = assert_ok!(users.get(1).await);
    assert_eq!(all, in_flow);
    assert_eq!(one.nick.as_deref(), Some("Jackie"));

    let opts = UserUpdateOptions {
        nick: Some("Jax".to_string()),
        ..Default::default()
    };
    let (updated, _) = assert_ok!(users.update(1, &opts).await);
    assert_eq!(updated.nick.as_deref(), Some("Jax"));
}

#[tokio::test]
async fn test_organizations() {
    let server = MockServer::start().await;
    let org = json!({
        "id": 1,
        "parameterized_name": "acme",
        "name": "ACME",
        "user_limit": 10,
        "user_count": 3,
        "users": [{ "id": 1, "nick": "Jackie" }]
    });
    Mock::given(method("GET"))
        .and(path("/organizations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([org.clone()])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/organizations/acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(org.clone()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/organizations/find"))
        .and(query_param("id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(org.clone()))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/organizations/1"))
        .and(body_json(json!({ "user_limit": 20 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "user_limit": 20 })))
        .expect(1)
        .mount(&server)
        .await;

    let orgs = client(&server).organizations();
    let (all, _) = assert_ok!(orgs.all().await);
    let (by_name, _) = assert_ok!(orgs.get_by_parameterized_name("acme").await);
    let (by_id, _) = assert_ok!(orgs.get_by_id(1).await);

    assert_eq!(all.len(), 1);
    assert_eq!(by_name, by_id);
    assert_eq!(by_id.users.as_ref().map(Vec::len), Some(1));

    let opts = OrganizationUpdateOptions {
        user_limit: Some(20),
        ..Default::default()
    };
    let (updated, _) = assert_ok!(orgs.update(1, &opts).await);
    assert_eq!(updated.user_limit, Some(20));
}

#[tokio::test]
async fn test_inbox_create() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages/team_inbox/flow-api-token"))
        .and(body_string(
            "source=CI&from_address=ci%40example.com&subject=Deployed&content=%3Cb%3Edone%3C%2Fb%3E&tags=deployment%2Cproduction",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = FlowdockClient::builder()
        .rest_url(server.uri())
        .build()
        .unwrap();
    let opts = InboxCreateOptions {
        source: Some("CI".to_string()),
        from_address: Some("ci@example.com".to_string()),
        subject: Some("Deployed".to_string()),
        content: Some("<b>done</b>".to_string()),
        tags: vec!["deployment".to_string(), "production".to_string()],
        ..Default::default()
    };
    let (msg, _) = assert_ok!(client.inbox().create("flow-api-token", &opts).await);
    assert!(msg.id.is_none());
}

#[tokio::test]
async fn test_error_response_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/flows/org"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "message": "Validation error", "errors": { "name": ["blank"] } })),
        )
        .mount(&server)
        .await;

    let opts = FlowsCreateOptions {
        name: String::new(),
    };
    let err = assert_err!(client(&server).flows().create("org", &opts).await);

    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));
    match err {
        Error::Api(resp) => {
            assert_eq!(resp.status, 400);
            assert_eq!(resp.url.path(), "/flows/org");
            assert_eq!(resp.message.as_deref(), Some("Validation error"));
            assert!(String::from_utf8_lossy(&resp.data).contains("blank"));
        }
        other => panic!("expected Error::Api, got {:?}", other),
    }
}

#[tokio::test]
async fn test_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flows/org/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let err = assert_err!(client(&server).flows().get("org", "missing").await);
    assert!(err.is_not_found());
    assert!(err.to_string().contains("Not Found"));
}

#[tokio::test]
async fn test_redirect_loop_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flows"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/flows", server.uri())),
        )
        .mount(&server)
        .await;

    let err = assert_err!(client(&server).flows().list(false, None).await);
    assert!(matches!(err, Error::Http(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_undecodable_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = assert_err!(client(&server).users().get(1).await);
    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn test_user_agent_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(header("user-agent", "deploy-bot/2.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = FlowdockClient::builder()
        .rest_url(server.uri())
        .user_agent("deploy-bot/2.0")
        .build()
        .unwrap();
    assert_ok!(client.users().all().await);
}

#[tokio::test]
async fn test_names_are_escaped_in_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flows/my%20org/what%3F%23now/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let (messages, raw) = assert_ok!(
        client(&server)
            .messages()
            .list("my org", "what?#now", None)
            .await
    );
    assert!(messages.is_empty());
    assert_eq!(raw.url.path(), "/flows/my%20org/what%3F%23now/messages");
    assert_eq!(raw.url.query(), None);
}
