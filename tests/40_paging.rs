mod common;

use anyhow::Result;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use common::{amount_of, SARAH};

async fn list(server: &common::TestServer, query: &str) -> Result<(StatusCode, Vec<Value>)> {
    let res = server
        .as_user(Method::GET, &format!("/cashcards{}", query), SARAH)
        .send()
        .await?;
    let status = res.status();
    let cards = if status == StatusCode::OK {
        res.json::<Vec<Value>>().await?
    } else {
        Vec::new()
    };
    Ok((status, cards))
}

fn amounts(cards: &[Value]) -> Vec<f64> {
    cards.iter().map(amount_of).collect()
}

fn assert_amounts(cards: &[Value], expected: &[f64]) {
    let actual = amounts(cards);
    assert_eq!(actual.len(), expected.len(), "got {actual:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-9, "expected {expected:?}, got {actual:?}");
    }
}

fn ids(cards: &[Value]) -> Vec<i64> {
    cards.iter().map(|c| c["id"].as_i64().unwrap()).collect()
}

#[tokio::test]
async fn returns_a_page_of_cards() -> Result<()> {
    let server = common::spawn_server().await?;

    let (status, cards) = list(&server, "?page=0&size=1").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cards.len(), 1);
    Ok(())
}

#[tokio::test]
async fn defaults_to_ascending_amount() -> Result<()> {
    let server = common::spawn_server().await?;

    let (status, cards) = list(&server, "").await?;

    assert_eq!(status, StatusCode::OK);
    assert_amounts(&cards, &[1.00, 123.45, 150.00]);
    Ok(())
}

#[tokio::test]
async fn sorts_descending_when_asked() -> Result<()> {
    let server = common::spawn_server().await?;

    let (status, cards) = list(&server, "?page=0&size=1&sort=amount,desc").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cards.len(), 1);
    assert_amounts(&cards, &[150.00]);
    Ok(())
}

#[tokio::test]
async fn sorts_by_id() -> Result<()> {
    let server = common::spawn_server().await?;

    let (_, cards) = list(&server, "?sort=id,desc").await?;

    assert_eq!(ids(&cards), vec![101, 100, 99]);
    Ok(())
}

#[tokio::test]
async fn sequential_pages_cover_every_card_once() -> Result<()> {
    let server = common::spawn_server().await?;

    // Add cards with duplicate amounts so the id tie-break matters
    for amount in [123.45, 1.00, 77.0] {
        let res = server
            .as_user(Method::POST, "/cashcards", SARAH)
            .json(&json!({ "amount": amount }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let (_, everything) = list(&server, "?size=100").await?;
    assert_eq!(everything.len(), 6);

    let mut stitched = Vec::new();
    for page in 0.. {
        let (status, cards) = list(&server, &format!("?page={}&size=4", page)).await?;
        assert_eq!(status, StatusCode::OK);
        assert!(cards.len() <= 4);
        if cards.is_empty() {
            break;
        }
        stitched.extend(cards);
    }

    assert_eq!(ids(&stitched), ids(&everything));
    let sorted = amounts(&stitched);
    assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
    Ok(())
}

#[tokio::test]
async fn page_past_the_end_is_empty() -> Result<()> {
    let server = common::spawn_server().await?;

    let (status, cards) = list(&server, "?page=5&size=20").await?;

    assert_eq!(status, StatusCode::OK);
    assert!(cards.is_empty());
    Ok(())
}

#[tokio::test]
async fn unknown_sort_property_is_a_bad_request() -> Result<()> {
    let server = common::spawn_server().await?;

    let (status, _) = list(&server, "?sort=owner,asc").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = list(&server, "?sort=amount,sideways").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}
