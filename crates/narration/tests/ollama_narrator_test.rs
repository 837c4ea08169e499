//! Integration tests for [`narration::OllamaNarrator`] against a mockito server.

use mockito::Matcher;
use narration::{build_story_prompt, ImagePayload, NarrationError, Narrator, OllamaNarrator};
use serde_json::json;

fn images() -> Vec<ImagePayload> {
    vec![
        ImagePayload::new(b"first".to_vec(), "image/jpeg"),
        ImagePayload::new(b"second".to_vec(), "image/png"),
    ]
}

/// **Test: Successful chat returns the trimmed story.**
///
/// **Setup:** Mock `/api/chat` expecting model `llava`, `stream: false` and both images base64-encoded in order.
/// **Action:** `narrate(prompt, images)`.
/// **Expected:** Returns the message content without surrounding whitespace.
#[tokio::test]
async fn test_narrate_success() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({ "model": "llava", "stream": false })),
            Matcher::Regex(r#""images":\["Zmlyc3Q=","c2Vjb25k"\]"#.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": {"role": "assistant", "content": "  A day at the park.\n"}, "done": true}"#)
        .create_async()
        .await;

    let narrator = OllamaNarrator::new(server.url());
    let prompt = build_story_prompt("2024-05-01", "sunny", "Park");
    let story = narrator.narrate(&prompt, &images()).await.unwrap();

    assert_eq!(story, "A day at the park.");
    mock.assert_async().await;
}

/// **Test: Non-2xx status maps to `NarrationError::Api`.**
///
/// **Setup:** Mock returns 500 with a text body.
/// **Expected:** `Api { status: 500, body }` carrying the server message.
#[tokio::test]
async fn test_narrate_api_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/chat")
        .with_status(500)
        .with_body("model not loaded")
        .create_async()
        .await;

    let narrator = OllamaNarrator::new(format!("{}/", server.url())).with_model("bakllava");
    let err = narrator.narrate("prompt", &images()).await.unwrap_err();

    match err {
        NarrationError::Api { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "model not loaded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

/// **Test: Blank or missing content is an invalid response.**
#[tokio::test]
async fn test_narrate_blank_content() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/chat")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": {"role": "assistant", "content": "   "}}"#)
        .create_async()
        .await;

    let narrator = OllamaNarrator::new(server.url());
    let err = narrator.narrate("prompt", &images()).await.unwrap_err();

    assert!(matches!(err, NarrationError::InvalidResponse(_)));
}

/// **Test: Unparsable body is an invalid response.**
#[tokio::test]
async fn test_narrate_unparsable_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/chat")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("not json")
        .create_async()
        .await;

    let narrator = OllamaNarrator::new(server.url());
    let err = narrator.narrate("prompt", &images()).await.unwrap_err();

    assert!(matches!(err, NarrationError::InvalidResponse(_)));
}

/// **Test: No images fails before any request.**
///
/// **Setup:** Mock expecting zero calls.
/// **Expected:** `NoImages`; mock never hit.
#[tokio::test]
async fn test_narrate_without_images() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/chat")
        .expect(0)
        .create_async()
        .await;

    let narrator = OllamaNarrator::new(server.url());
    let err = narrator.narrate("prompt", &[]).await.unwrap_err();

    assert!(matches!(err, NarrationError::NoImages));
    mock.assert_async().await;
}
