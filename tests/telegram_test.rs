use ofertas_bot::offer::{Offer, Store};
use ofertas_bot::telegram::TelegramClient;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn offer(image_url: Option<&str>) -> Offer {
    Offer {
        title: "Fone Bluetooth XYZ".to_string(),
        url: "https://www.amazon.com.br/dp/B0ABC".to_string(),
        store: Store::Amazon,
        image_url: image_url.map(str::to_string),
        original_price: None,
        price: "R$ 99,90".to_string(),
    }
}

fn client(server: &MockServer) -> TelegramClient {
    TelegramClient::new(reqwest::Client::new(), "testtoken", -1000123)
        .with_base_url(server.uri())
}

#[tokio::test]
async fn test_offer_without_image_goes_out_as_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bottesttoken/sendMessage"))
        .and(body_partial_json(serde_json::json!({
            "chat_id": -1000123,
            "parse_mode": "HTML",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .send_offer(&offer(None), "https://www.amazon.com.br/dp/B0ABC?tag=x-20")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_offer_with_image_goes_out_as_photo() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bottesttoken/sendPhoto"))
        .and(body_partial_json(serde_json::json!({
            "photo": "https://cdn.example.com/fone.jpg",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .send_offer(
            &offer(Some("https://cdn.example.com/fone.jpg")),
            "https://www.amazon.com.br/dp/B0ABC?tag=x-20",
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_failed_photo_falls_back_to_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bottesttoken/sendPhoto"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "ok": false,
            "description": "Bad Request: wrong file identifier",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bottesttoken/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .send_offer(
            &offer(Some("https://cdn.example.com/dead.jpg")),
            "https://www.amazon.com.br/dp/B0ABC?tag=x-20",
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_ok_false_is_surfaced_as_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bottesttoken/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": false,
            "description": "Forbidden: bot was kicked from the group chat",
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .send_offer(&offer(None), "https://www.amazon.com.br/dp/B0ABC")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("kicked"));
}

#[tokio::test]
async fn test_http_error_includes_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bottesttoken/sendMessage"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "ok": false,
            "description": "Too Many Requests: retry after 12",
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .send_offer(&offer(None), "https://www.amazon.com.br/dp/B0ABC")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Too Many Requests"));
}
