//! Recipes, catalogue, favorites, shopping cart and short links

mod common;

use axum::http::{Method, StatusCode};
use chrono::Utc;
use common::{recipe_payload, TestApp, PIXEL_PNG};
use pretty_assertions::assert_eq;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_catalogue_endpoints(pool: PgPool) {
    let app = TestApp::new(pool);
    let dinner = app.tag("Dinner", "dinner").await;
    app.tag("Breakfast", "breakfast").await;
    app.ingredient("salt", "pinch").await;
    app.ingredient("sugar", "g").await;
    app.ingredient("rice", "g").await;
    app.ingredient("100% juice", "ml").await;

    let tags = app.get("/api/tags/", None).await.json();
    let names: Vec<&str> = tags
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Breakfast", "Dinner"]);

    let tag = app.get(&format!("/api/tags/{dinner}/"), None).await.json();
    assert_eq!(tag, json!({ "id": dinner, "name": "Dinner", "slug": "dinner" }));

    let filtered = app.get("/api/ingredients/?name=S", None).await.json();
    let names: Vec<&str> = filtered
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["salt", "sugar"]);

    let literal_percent = app.get("/api/ingredients/?name=%25", None).await.json();
    assert_eq!(literal_percent.as_array().unwrap().len(), 0);

    assert_eq!(app.get("/api/ingredients/", None).await.json().as_array().unwrap().len(), 4);
    assert_eq!(app.get("/api/tags/424242/", None).await.status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_recipe_representation(pool: PgPool) {
    let app = TestApp::new(pool);
    let author = app.user("author").await;
    let dinner = app.tag("Dinner", "dinner").await;
    let rice = app.ingredient("rice", "g").await;
    let salt = app.ingredient("salt", "pinch").await;

    let response = app
        .post(
            "/api/recipes/",
            Some(&author.token),
            recipe_payload("Pilaf", &[dinner], &[(rice, 300), (salt, 2)]),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());

    let body = response.json();
    assert_eq!(body["name"], "Pilaf");
    assert_eq!(body["cooking_time"], 25);
    assert_eq!(body["is_favorited"], false);
    assert_eq!(body["is_in_shopping_cart"], false);
    assert_eq!(body["author"]["username"], "author");
    assert_eq!(body["author"]["is_subscribed"], false);
    assert_eq!(body["tags"], json!([{ "id": dinner, "name": "Dinner", "slug": "dinner" }]));
    assert_eq!(
        body["ingredients"],
        json!([
            { "id": rice, "name": "rice", "measurement_unit": "g", "amount": 300 },
            { "id": salt, "name": "salt", "measurement_unit": "pinch", "amount": 2 },
        ])
    );

    let image = body["image"].as_str().unwrap();
    assert!(image.starts_with("/media/recipes/images/"));
    assert!(app.media.path().join(image.trim_start_matches("/media/")).exists());

    let fetched = app
        .get(&format!("/api/recipes/{}/", body["id"]), None)
        .await
        .json();
    assert_eq!(fetched["name"], "Pilaf");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_recipe_accepts_numeric_strings(pool: PgPool) {
    let app = TestApp::new(pool);
    let author = app.user("author").await;
    let dinner = app.tag("Dinner", "dinner").await;
    let rice = app.ingredient("rice", "g").await;

    let response = app
        .post(
            "/api/recipes/",
            Some(&author.token),
            json!({
                "name": "Pilaf",
                "text": "Simmer the rice.",
                "image": PIXEL_PNG,
                "cooking_time": "5",
                "tags": [dinner.to_string()],
                "ingredients": [{ "id": rice.to_string(), "amount": "10" }],
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
    let body = response.json();
    assert_eq!(body["cooking_time"], 5);
    assert_eq!(body["tags"][0]["id"], dinner);
    assert_eq!(body["ingredients"][0]["amount"], 10);

    let invalid = app
        .post(
            "/api/recipes/",
            Some(&author.token),
            json!({
                "name": "Pilaf",
                "text": "Simmer the rice.",
                "image": PIXEL_PNG,
                "cooking_time": "soon",
                "tags": [dinner],
                "ingredients": [{ "id": rice, "amount": "a lot" }],
            }),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    let body = invalid.json();
    assert_eq!(body["cooking_time"], json!(["A valid integer is required."]));
    assert_eq!(body["ingredients"], json!(["A valid integer is required."]));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_recipe_validation(pool: PgPool) {
    let app = TestApp::new(pool);
    let author = app.user("author").await;
    let dinner = app.tag("Dinner", "dinner").await;
    let rice = app.ingredient("rice", "g").await;

    let anonymous = app
        .post("/api/recipes/", None, recipe_payload("Pilaf", &[dinner], &[(rice, 1)]))
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let empty = app.post("/api/recipes/", Some(&author.token), json!({})).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    let body = empty.json();
    for field in ["name", "text", "image", "cooking_time", "tags", "ingredients"] {
        assert_eq!(body[field], json!(["This field is required."]), "{field}");
    }

    let mut payload = recipe_payload("Pilaf", &[dinner, dinner], &[(rice, 1), (rice, 2)]);
    payload["cooking_time"] = json!(0);
    let repeated = app.post("/api/recipes/", Some(&author.token), payload).await;
    assert_eq!(repeated.status, StatusCode::BAD_REQUEST);
    let body = repeated.json();
    assert_eq!(body["tags"], json!(["Tags must not repeat."]));
    assert_eq!(body["ingredients"], json!(["Ingredients must not repeat."]));
    assert_eq!(
        body["cooking_time"],
        json!(["Ensure this value is greater than or equal to 1."])
    );

    let unknown = app
        .post(
            "/api/recipes/",
            Some(&author.token),
            recipe_payload("Pilaf", &[dinner], &[(999_999, 1), (rice, 32_001)]),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        unknown.json()["ingredients"],
        json!([
            "Ingredient with id 999999 does not exist.",
            "Ensure this value is less than or equal to 32000."
        ])
    );

    let mut payload = recipe_payload("Pilaf", &[dinner], &[(rice, 1)]);
    payload["image"] = json!("not an image");
    let bad_image = app.post("/api/recipes/", Some(&author.token), payload).await;
    assert_eq!(bad_image.status, StatusCode::BAD_REQUEST);
    assert!(bad_image.json().get("image").is_some());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_and_delete_are_author_only(pool: PgPool) {
    let app = TestApp::new(pool);
    let author = app.user("author").await;
    let stranger = app.user("stranger").await;
    let dinner = app.tag("Dinner", "dinner").await;
    let lunch = app.tag("Lunch", "lunch").await;
    let rice = app.ingredient("rice", "g").await;
    let salt = app.ingredient("salt", "pinch").await;
    let id = app.recipe(&author, "Pilaf", &[dinner], &[(rice, 300)]).await;
    let uri = format!("/api/recipes/{id}/");

    let forbidden = app
        .patch(&uri, Some(&stranger.token), json!({ "name": "Mine now" }))
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(
        forbidden.json()["detail"],
        "You do not have permission to perform this action."
    );

    let without_relations = app
        .patch(&uri, Some(&author.token), json!({ "name": "Pilaf 2" }))
        .await;
    assert_eq!(without_relations.status, StatusCode::BAD_REQUEST);
    assert!(without_relations.json().get("tags").is_some());

    let updated = app
        .patch(
            &uri,
            Some(&author.token),
            json!({
                "name": "Spicy pilaf",
                "cooking_time": 40,
                "tags": [lunch],
                "ingredients": [{ "id": salt, "amount": 3 }],
            }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{}", updated.text());
    let body = updated.json();
    assert_eq!(body["name"], "Spicy pilaf");
    assert_eq!(body["cooking_time"], 40);
    assert_eq!(body["text"], "How to cook Pilaf.");
    assert_eq!(body["tags"][0]["slug"], "lunch");
    assert_eq!(body["tags"].as_array().unwrap().len(), 1);
    assert_eq!(body["ingredients"][0]["id"], salt);
    assert_eq!(body["ingredients"].as_array().unwrap().len(), 1);

    let replaced = app
        .request(
            Method::PUT,
            &uri,
            Some(&author.token),
            Some(json!({
                "name": "Pilaf again",
                "tags": [dinner],
                "ingredients": [{ "id": rice, "amount": 250 }],
            })),
        )
        .await;
    assert_eq!(replaced.status, StatusCode::OK, "{}", replaced.text());
    let body = replaced.json();
    assert_eq!(body["name"], "Pilaf again");
    assert_eq!(body["cooking_time"], 40);
    assert_eq!(body["tags"][0]["slug"], "dinner");
    assert_eq!(body["ingredients"][0]["amount"], 250);

    assert_eq!(
        app.delete(&uri, Some(&stranger.token)).await.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        app.delete(&uri, Some(&author.token)).await.status,
        StatusCode::NO_CONTENT
    );
    assert_eq!(app.get(&uri, None).await.status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_replaces_image(pool: PgPool) {
    let app = TestApp::new(pool);
    let author = app.user("author").await;
    let dinner = app.tag("Dinner", "dinner").await;
    let rice = app.ingredient("rice", "g").await;
    let id = app.recipe(&author, "Pilaf", &[dinner], &[(rice, 300)]).await;
    let uri = format!("/api/recipes/{id}/");

    let before = app.get(&uri, None).await.json()["image"]
        .as_str()
        .unwrap()
        .to_string();

    let updated = app
        .patch(
            &uri,
            Some(&author.token),
            json!({
                "image": PIXEL_PNG,
                "tags": [dinner],
                "ingredients": [{ "id": rice, "amount": 300 }],
            }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);

    let after = updated.json()["image"].as_str().unwrap().to_string();
    assert_ne!(before, after);
    assert!(!app.media.path().join(before.trim_start_matches("/media/")).exists());
    assert!(app.media.path().join(after.trim_start_matches("/media/")).exists());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_filters(pool: PgPool) {
    let app = TestApp::new(pool);
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;
    let dinner = app.tag("Dinner", "dinner").await;
    let lunch = app.tag("Lunch", "lunch").await;
    let breakfast = app.tag("Breakfast", "breakfast").await;
    let rice = app.ingredient("rice", "g").await;

    let soup = app.recipe(&alice, "Soup", &[lunch], &[(rice, 50)]).await;
    let pilaf = app.recipe(&alice, "Pilaf", &[dinner], &[(rice, 300)]).await;
    let porridge = app.recipe(&bob, "Porridge", &[breakfast], &[(rice, 80)]).await;

    let ids = |body: serde_json::Value| -> Vec<i64> {
        body["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect()
    };

    let all = app.get("/api/recipes/", None).await.json();
    assert_eq!(all["count"], 3);
    assert_eq!(ids(all), vec![porridge, pilaf, soup]);

    let by_author = app
        .get(&format!("/api/recipes/?author={}", alice.id), None)
        .await
        .json();
    assert_eq!(ids(by_author), vec![pilaf, soup]);

    let by_tags = app
        .get("/api/recipes/?tags=lunch&tags=breakfast", None)
        .await
        .json();
    assert_eq!(ids(by_tags), vec![porridge, soup]);

    let bad_author = app.get("/api/recipes/?author=me", None).await;
    assert_eq!(bad_author.status, StatusCode::BAD_REQUEST);

    app.post(&format!("/api/recipes/{pilaf}/favorite/"), Some(&bob.token), json!({}))
        .await;
    app.post(&format!("/api/recipes/{soup}/shopping_cart/"), Some(&bob.token), json!({}))
        .await;

    let favorites = app
        .get("/api/recipes/?is_favorited=1", Some(&bob.token))
        .await
        .json();
    assert_eq!(ids(favorites.clone()), vec![pilaf]);
    assert_eq!(favorites["results"][0]["is_favorited"], true);

    let cart = app
        .get("/api/recipes/?is_in_shopping_cart=1", Some(&bob.token))
        .await
        .json();
    assert_eq!(ids(cart), vec![soup]);

    let anonymous_favorites = app.get("/api/recipes/?is_favorited=1", None).await.json();
    assert_eq!(anonymous_favorites["count"], 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_favorites_and_cart_errors(pool: PgPool) {
    let app = TestApp::new(pool);
    let author = app.user("author").await;
    let reader = app.user("reader").await;
    let dinner = app.tag("Dinner", "dinner").await;
    let rice = app.ingredient("rice", "g").await;
    let id = app.recipe(&author, "Pilaf", &[dinner], &[(rice, 300)]).await;

    let favorite = format!("/api/recipes/{id}/favorite/");
    let added = app.post(&favorite, Some(&reader.token), json!({})).await;
    assert_eq!(added.status, StatusCode::CREATED);
    let body = added.json();
    assert_eq!(body["id"], id);
    assert_eq!(body["name"], "Pilaf");
    assert_eq!(body["cooking_time"], 25);
    assert!(body.get("text").is_none());

    let duplicate = app.post(&favorite, Some(&reader.token), json!({})).await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.json()["errors"], "This recipe is already in favorites.");

    assert_eq!(
        app.delete(&favorite, Some(&reader.token)).await.status,
        StatusCode::NO_CONTENT
    );
    let missing = app.delete(&favorite, Some(&reader.token)).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.json()["errors"], "This recipe is not in favorites.");

    let cart = format!("/api/recipes/{id}/shopping_cart/");
    app.post(&cart, Some(&reader.token), json!({})).await;
    let duplicate = app.post(&cart, Some(&reader.token), json!({})).await;
    assert_eq!(
        duplicate.json()["errors"],
        "This recipe is already in the shopping cart."
    );

    assert_eq!(
        app.post("/api/recipes/999999/favorite/", Some(&reader.token), json!({}))
            .await
            .status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.post(&favorite, None, json!({})).await.status,
        StatusCode::UNAUTHORIZED
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_download_shopping_cart_aggregates(pool: PgPool) {
    let app = TestApp::new(pool);
    let author = app.user("author").await;
    let dinner = app.tag("Dinner", "dinner").await;
    let flour = app.ingredient("flour", "g").await;
    let egg = app.ingredient("egg", "pcs").await;

    let pancakes = app
        .recipe(&author, "Pancakes", &[dinner], &[(flour, 200), (egg, 2)])
        .await;
    let bread = app.recipe(&author, "Bread", &[dinner], &[(flour, 100)]).await;
    for id in [pancakes, bread] {
        app.post(
            &format!("/api/recipes/{id}/shopping_cart/"),
            Some(&author.token),
            json!({}),
        )
        .await;
    }

    let response = app
        .get("/api/recipes/download_shopping_cart/", Some(&author.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response
        .header("content-type")
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(
        response.header("content-disposition"),
        Some("attachment; filename=\"shopping_list.txt\"")
    );

    let expected = format!(
        "Shopping list compiled: {}\n\
         Products:\n\
         1. Egg — 2 pcs\n\
         2. Flour — 300 g\n\
         \n\
         Recipes in this shopping list:\n\
         1. Bread\n\
         2. Pancakes",
        Utc::now().date_naive().format("%d-%m-%Y")
    );
    assert_eq!(response.text(), expected);

    let empty = app.user("empty").await;
    let text = app
        .get("/api/recipes/download_shopping_cart/", Some(&empty.token))
        .await
        .text();
    assert!(text.contains("No ingredients"));
    assert!(text.contains("No recipes"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_short_links(pool: PgPool) {
    let app = TestApp::new(pool);
    let author = app.user("author").await;
    let dinner = app.tag("Dinner", "dinner").await;
    let rice = app.ingredient("rice", "g").await;
    let id = app.recipe(&author, "Pilaf", &[dinner], &[(rice, 300)]).await;

    let link = app.get(&format!("/api/recipes/{id}/get-link/"), None).await;
    assert_eq!(link.status, StatusCode::OK);
    assert_eq!(
        link.json()["short-link"],
        format!("http://testserver/r/{id}/").as_str()
    );

    let redirect = app.get(&format!("/r/{id}/"), None).await;
    assert_eq!(redirect.status, StatusCode::FOUND);
    assert_eq!(redirect.header("location"), Some(format!("/recipes/{id}").as_str()));

    assert_eq!(app.get("/r/999999/", None).await.status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_listings_require_staff(pool: PgPool) {
    let app = TestApp::new(pool);
    let admin = app.user("admin").await;
    let cook = app.user("cook").await;
    let dinner = app.tag("Dinner", "dinner").await;
    let rice = app.ingredient("rice", "g").await;
    app.recipe(&cook, "Pilaf", &[dinner], &[(rice, 300)]).await;

    assert_eq!(
        app.get("/admin/users/", None).await.status,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        app.get("/admin/users/", Some(&cook.token)).await.status,
        StatusCode::FORBIDDEN
    );

    sqlx::query("UPDATE users SET is_staff = TRUE WHERE id = $1")
        .bind(admin.id)
        .execute(&app.pool)
        .await
        .unwrap();

    let users = app.get("/admin/users/?search=COOK@EX", Some(&admin.token)).await;
    assert_eq!(users.status, StatusCode::OK);
    let users = users.json();
    assert_eq!(users.as_array().unwrap().len(), 1);
    assert_eq!(users[0]["username"], "cook");
    assert_eq!(users[0]["recipes_count"], 1);

    let recipes = app
        .get("/admin/recipes/?tags=dinner", Some(&admin.token))
        .await
        .json();
    assert_eq!(recipes[0]["name"], "Pilaf");
    assert_eq!(recipes[0]["favorite_count"], 0);
    assert_eq!(recipes[0]["tags"], json!(["Dinner"]));

    let ingredients = app
        .get("/admin/ingredients/?search=ric", Some(&admin.token))
        .await
        .json();
    assert_eq!(ingredients[0]["name"], "rice");
}
