use chrono::Utc;
use recipe_server::entity::recipe;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;

use crate::common::{MIB, TestApp, routes};

mod new_recipe_call_site {
    use super::*;

    #[tokio::test]
    async fn issues_a_fresh_key_scoped_to_the_request() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;
        let user_id = app.user_id(&token).await;

        let res = app
            .post_with_token(
                routes::UPLOAD_URL,
                &json!({"mime_type": "image/jpeg", "size": 2048}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let key = res.body["file_name"].as_str().unwrap();
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(res.body["url"].as_str().unwrap().contains(key));
        assert_eq!(res.body["expires_in"], 60);

        let issued = app.store.issued();
        assert_eq!(issued.len(), 1);
        assert_eq!(issued[0].key, key);
        assert_eq!(issued[0].content_type, "image/jpeg");
        assert_eq!(issued[0].content_length, 2048);
        assert_eq!(issued[0].owner_id, user_id);
        assert_eq!(issued[0].expires_in_secs, 60);

        // Nothing is written until the client uploads.
        assert!(!app.store.contains(key));
    }

    #[tokio::test]
    async fn every_request_gets_a_different_key() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;
        let body = json!({"mime_type": "image/png", "size": 10});

        let first = app.post_with_token(routes::UPLOAD_URL, &body, &token).await;
        let second = app.post_with_token(routes::UPLOAD_URL, &body, &token).await;

        assert_ne!(first.body["file_name"], second.body["file_name"]);
    }

    #[tokio::test]
    async fn every_non_image_type_is_refused_without_a_credential() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;

        for mime in ["text/html", "application/pdf", "video/mp4", "image/bmp", "IMAGE/PNG"] {
            let res = app
                .post_with_token(
                    routes::UPLOAD_URL,
                    &json!({"mime_type": mime, "size": 10}),
                    &token,
                )
                .await;
            assert_eq!(res.status, 415, "{mime}: {}", res.text);
            assert_eq!(res.body["code"], "UNSUPPORTED_MEDIA_TYPE");
        }
        assert!(app.store.issued().is_empty());
    }

    #[tokio::test]
    async fn ceiling_is_ten_mebibytes_inclusive() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;

        let at_limit = app
            .post_with_token(
                routes::UPLOAD_URL,
                &json!({"mime_type": "image/png", "size": 10 * MIB}),
                &token,
            )
            .await;
        assert_eq!(at_limit.status, 200, "{}", at_limit.text);

        for size in [10 * MIB + 1, 50 * MIB] {
            let res = app
                .post_with_token(
                    routes::UPLOAD_URL,
                    &json!({"mime_type": "image/png", "size": size}),
                    &token,
                )
                .await;
            assert_eq!(res.status, 413, "{size}: {}", res.text);
            assert_eq!(res.body["code"], "FILE_TOO_LARGE");
        }
        assert_eq!(app.store.issued().len(), 1);
    }

    #[tokio::test]
    async fn empty_file_is_refused() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;

        let res = app
            .post_with_token(
                routes::UPLOAD_URL,
                &json!({"mime_type": "image/png", "size": 0}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unauthenticated_request_issues_nothing() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::UPLOAD_URL,
                &json!({"mime_type": "image/png", "size": 10}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
        assert!(app.store.issued().is_empty());
    }
}

mod replace_call_site {
    use super::*;

    #[tokio::test]
    async fn reissuing_returns_the_linked_media_key_every_time() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;
        let key = app.upload_image(&token).await;
        let recipe = app.create_recipe(&token, Some(&key)).await;
        let recipe_id = recipe["id"].as_str().unwrap();

        for _ in 0..2 {
            let res = app
                .post_with_token(
                    &routes::recipe_upload_url(recipe_id),
                    &json!({"mime_type": "image/webp", "size": 1024}),
                    &token,
                )
                .await;
            assert_eq!(res.status, 200, "{}", res.text);
            assert_eq!(res.body["file_name"], key.as_str());
        }
    }

    #[tokio::test]
    async fn recipe_without_media_reuses_its_own_id() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;
        let recipe = app.create_recipe(&token, None).await;
        let recipe_id = recipe["id"].as_str().unwrap();

        let res = app
            .post_with_token(
                &routes::recipe_upload_url(recipe_id),
                &json!({"mime_type": "image/png", "size": 1024}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["file_name"], recipe_id);
    }

    #[tokio::test]
    async fn ceiling_is_five_mebibytes() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;
        let recipe = app.create_recipe(&token, None).await;
        let recipe_id = recipe["id"].as_str().unwrap();
        let body = json!({"mime_type": "image/png", "size": 5 * MIB + 1});

        let res = app
            .post_with_token(&routes::recipe_upload_url(recipe_id), &body, &token)
            .await;
        assert_eq!(res.status, 413);
        assert_eq!(res.body["code"], "FILE_TOO_LARGE");

        // The same file is still fine for a new recipe.
        let res = app.post_with_token(routes::UPLOAD_URL, &body, &token).await;
        assert_eq!(res.status, 200, "{}", res.text);
    }

    #[tokio::test]
    async fn only_the_owner_can_get_a_replace_credential() {
        let app = TestApp::spawn().await;
        let owner = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;
        let other = app
            .create_authenticated_user("bob@example.com", "securepass")
            .await;
        let recipe = app.create_recipe(&owner, None).await;
        let recipe_id = recipe["id"].as_str().unwrap();

        let res = app
            .post_with_token(
                &routes::recipe_upload_url(recipe_id),
                &json!({"mime_type": "image/png", "size": 10}),
                &other,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
        assert!(app.store.issued().is_empty());
    }

    #[tokio::test]
    async fn recipe_id_cannot_shadow_another_users_image() {
        let app = TestApp::spawn().await;
        let owner = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;
        let other = app
            .create_authenticated_user("bob@example.com", "securepass")
            .await;
        let key = app.upload_image(&owner).await;
        let issued_before = app.store.issued().len();

        let res = app
            .post_with_token(
                routes::RECIPES,
                &json!({
                    "id": key,
                    "title": "Shadow",
                    "ingredients": ["flour"],
                    "steps": ["bake"],
                    "category_id": app.category_id("Breakfast").await,
                }),
                &other,
            )
            .await;
        assert_eq!(res.status, 409, "{}", res.text);
        assert_eq!(res.body["code"], "CONFLICT");

        let res = app
            .post_with_token(
                &routes::recipe_upload_url(&key),
                &json!({"mime_type": "image/png", "size": 10}),
                &other,
            )
            .await;
        assert_eq!(res.status, 404);
        assert_eq!(app.store.issued().len(), issued_before);
    }

    #[tokio::test]
    async fn no_credential_for_a_key_held_by_another_users_media() {
        let app = TestApp::spawn().await;
        let owner = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;
        let other = app
            .create_authenticated_user("bob@example.com", "securepass")
            .await;
        let key = app.upload_image(&owner).await;
        let other_id = app.user_id(&other).await;

        // A row written before IDs were checked against media keys.
        let now = Utc::now();
        recipe::ActiveModel {
            id: Set(key.clone()),
            title: Set("Shadow".into()),
            ingredients: Set("flour".into()),
            steps: Set(None),
            category_id: Set(app.category_id("Breakfast").await),
            media_id: Set(None),
            user_id: Set(other_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&app.db)
        .await
        .unwrap();
        let issued_before = app.store.issued().len();

        let res = app
            .post_with_token(
                &routes::recipe_upload_url(&key),
                &json!({"mime_type": "image/png", "size": 10}),
                &other,
            )
            .await;

        assert_eq!(res.status, 403, "{}", res.text);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
        assert_eq!(app.store.issued().len(), issued_before);
    }

    #[tokio::test]
    async fn unknown_recipe_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;

        let res = app
            .post_with_token(
                &routes::recipe_upload_url("missing"),
                &json!({"mime_type": "image/png", "size": 10}),
                &token,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}
