//! Mock Steam Web API responses keyed by account

use serde_json::json;
use steam_sweep::{AccountId, AuthServer, Endpoint};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Shorthand for an account id
pub fn account(sequence: u32, auth_server: AuthServer) -> AccountId {
    AccountId {
        auth_server,
        sequence,
    }
}

fn id_param(account: AccountId) -> (&'static str, String) {
    ("steamid", account.to_steam_id64().to_string())
}

fn ok_json(body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

/// Every summary not otherwise mocked answers "no such account"
pub async fn mount_absent_by_default(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/{}", Endpoint::Summary.path())))
        .respond_with(ok_json(json!({"response": {"players": []}})))
        .with_priority(10)
        .mount(server)
        .await;
}

/// Mount a summary for `account`; `player` is the single entry of `players`
pub async fn mount_summary(server: &MockServer, account: AccountId, player: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/{}", Endpoint::Summary.path())))
        .and(query_param("steamids", account.to_steam_id64().to_string()))
        .respond_with(ok_json(json!({"response": {"players": [player]}})))
        .mount(server)
        .await;
}

pub async fn mount_level(server: &MockServer, account: AccountId, level: u32) {
    let (key, value) = id_param(account);
    Mock::given(method("GET"))
        .and(path(format!("/{}", Endpoint::Level.path())))
        .and(query_param(key, value))
        .respond_with(ok_json(json!({"response": {"player_level": level}})))
        .mount(server)
        .await;
}

pub async fn mount_games(server: &MockServer, account: AccountId, app_ids: &[u32]) {
    let (key, value) = id_param(account);
    let games: Vec<_> = app_ids.iter().map(|id| json!({"appid": id})).collect();
    Mock::given(method("GET"))
        .and(path(format!("/{}", Endpoint::Games.path())))
        .and(query_param(key, value))
        .respond_with(ok_json(
            json!({"response": {"game_count": games.len(), "games": games}}),
        ))
        .mount(server)
        .await;
}

pub async fn mount_badges(server: &MockServer, account: AccountId, badges: &[(u32, u32)]) {
    let (key, value) = id_param(account);
    let badges: Vec<_> = badges
        .iter()
        .map(|(id, level)| json!({"badgeid": id, "level": level}))
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("/{}", Endpoint::Badges.path())))
        .and(query_param(key, value))
        .respond_with(ok_json(json!({"response": {"badges": badges}})))
        .mount(server)
        .await;
}

/// Answer `endpoint` for `account` with a fixed status code
pub async fn mount_status(server: &MockServer, endpoint: Endpoint, account: AccountId, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/{}", endpoint.path())))
        .and(query_param(
            endpoint.id_param(),
            account.to_steam_id64().to_string(),
        ))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
