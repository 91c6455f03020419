mod support;

use axum::http::{Method, StatusCode};
use serde_json::json;
use support::{TestApp, names};
use uuid::Uuid;

const INGREDIENTS: &str = "/api/recipe/ingredients";
const RECIPES: &str = "/api/recipe/recipes";

async fn create_ingredient(app: &TestApp, user: Uuid, name: &str) -> i64 {
    let (status, body) = app.post(INGREDIENTS, user, json!({ "name": name })).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn create_recipe(app: &TestApp, user: Uuid, ingredients: Vec<i64>) -> i64 {
    let (status, body) = app
        .post(
            RECIPES,
            user,
            json!({
                "title": "Sniadanko",
                "time_minutes": 15,
                "price": 7.5,
                "tags": [],
                "ingredients": ingredients,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_login_required() {
    let app = TestApp::new();
    let (status, body) = app.request(Method::GET, INGREDIENTS, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_list_ingredients_scoped_and_ordered() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    let other = Uuid::new_v4();

    create_ingredient(&app, user, "Kale").await;
    create_ingredient(&app, user, "Salt").await;
    create_ingredient(&app, other, "Vinegar").await;

    let (status, body) = app.get(INGREDIENTS, user).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Salt", "Kale"]);
}

#[tokio::test]
async fn test_duplicate_names_order_newest_first() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    let first = create_ingredient(&app, user, "Salt").await;
    let second = create_ingredient(&app, user, "Salt").await;

    let (_, body) = app.get(INGREDIENTS, user).await;
    assert_eq!(support::ids(&body), vec![second, first]);
}

#[tokio::test]
async fn test_create_ingredient_blank_name() {
    let app = TestApp::new();
    let user = Uuid::new_v4();

    let (status, body) = app.post(INGREDIENTS, user, json!({ "name": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"]["name"], json!(["This field may not be blank."]));
}

#[tokio::test]
async fn test_update_and_delete_ingredient() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    let id = create_ingredient(&app, user, "Cabbage").await;
    let uri = format!("{INGREDIENTS}/{id}");

    let (status, body) = app.patch(&uri, user, json!({ "name": "Carrot" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Carrot");

    let (status, _) = app.delete(&uri, user).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.patch(&uri, user, json!({ "name": "Leek" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_filter_ingredients_assigned_to_recipes() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    let apples = create_ingredient(&app, user, "Apples").await;
    create_ingredient(&app, user, "Turkey").await;
    create_recipe(&app, user, vec![apples]).await;

    let (_, body) = app
        .get(&format!("{INGREDIENTS}?assigned_only=1"), user)
        .await;
    assert_eq!(names(&body), vec!["Apples"]);
}

#[tokio::test]
async fn test_filtered_ingredients_unique() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    let eggs = create_ingredient(&app, user, "Eggs").await;
    create_ingredient(&app, user, "Lentils").await;
    create_recipe(&app, user, vec![eggs]).await;
    create_recipe(&app, user, vec![eggs]).await;

    let (_, body) = app
        .get(&format!("{INGREDIENTS}?assigned_only=yes"), user)
        .await;
    assert_eq!(names(&body), vec!["Eggs"]);
}

#[tokio::test]
async fn test_deleted_ingredient_is_detached_from_recipes() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    let salt = create_ingredient(&app, user, "Salt").await;
    let pepper = create_ingredient(&app, user, "Pepper").await;
    let recipe = create_recipe(&app, user, vec![salt, pepper]).await;

    let (status, _) = app.delete(&format!("{INGREDIENTS}/{salt}"), user).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app.get(&format!("{RECIPES}/{recipe}"), user).await;
    assert_eq!(body["ingredients"], json!([{ "id": pepper, "name": "Pepper" }]));
}
