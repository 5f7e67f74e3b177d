use serde_json::json;

use crate::common::{BASE_URL, TestApp, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn uploaded_key_becomes_a_media_row_owned_by_the_caller() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;
        let user_id = app.user_id(&token).await;

        let key = app.upload_image(&token).await;

        let row = app.media_row(&key).await.expect("media row missing");
        assert_eq!(row.url, format!("{BASE_URL}/{key}"));
        assert_eq!(row.mime_type, "image/png");
        assert_eq!(row.user_id, user_id);
    }

    #[tokio::test]
    async fn registering_the_same_key_twice_conflicts() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;
        let key = app.upload_image(&token).await;

        let res = app
            .post_with_token(
                routes::MEDIA,
                &json!({"file_name": key, "mime_type": "image/png"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
        assert_eq!(app.media_count().await, 1);
    }

    #[tokio::test]
    async fn path_like_file_names_are_rejected() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;

        for file_name in ["", "../secret", "a/b", ".."] {
            let res = app
                .post_with_token(
                    routes::MEDIA,
                    &json!({"file_name": file_name, "mime_type": "image/png"}),
                    &token,
                )
                .await;
            assert_eq!(res.status, 400, "{file_name}: {}", res.text);
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
        assert_eq!(app.media_count().await, 0);
    }

    #[tokio::test]
    async fn another_users_recipe_id_cannot_be_registered() {
        let app = TestApp::spawn().await;
        let owner = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;
        let other = app
            .create_authenticated_user("bob@example.com", "securepass")
            .await;
        let owner_id = app.user_id(&owner).await;
        let recipe = app.create_recipe(&owner, None).await;
        let id = recipe["id"].as_str().unwrap();

        let res = app
            .post_with_token(
                routes::MEDIA,
                &json!({"file_name": id, "mime_type": "image/png"}),
                &other,
            )
            .await;
        assert_eq!(res.status, 403, "{}", res.text);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
        assert_eq!(app.media_count().await, 0);

        // The owner's replace flow still lands on that key.
        let cred = app
            .post_with_token(
                &routes::recipe_upload_url(id),
                &json!({"mime_type": "image/png", "size": 4}),
                &owner,
            )
            .await;
        assert_eq!(cred.status, 200, "{}", cred.text);
        assert_eq!(cred.body["file_name"], id);
        app.store.put_object(id, b"\x89PNG".to_vec());

        let res = app
            .put_with_token(
                &routes::recipe(id),
                &json!({
                    "title": "Pancakes",
                    "ingredients": ["flour", "eggs", "milk"],
                    "steps": ["whisk", "fry"],
                    "category_id": app.category_id("Breakfast").await,
                    "media": {"action": "replace", "file_name": id, "mime_type": "image/png"},
                }),
                &owner,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(app.media_row(id).await.unwrap().user_id, owner_id);
    }

    #[tokio::test]
    async fn owner_may_register_their_own_recipe_id() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;
        let recipe = app.create_recipe(&token, None).await;
        let id = recipe["id"].as_str().unwrap();

        let res = app
            .post_with_token(
                routes::MEDIA,
                &json!({"file_name": id, "mime_type": "image/png"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
    }

    #[tokio::test]
    async fn non_image_types_are_rejected() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;

        let res = app
            .post_with_token(
                routes::MEDIA,
                &json!({"file_name": "abc123", "mime_type": "text/html"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 415);
        assert_eq!(app.media_count().await, 0);
    }

    #[tokio::test]
    async fn unverified_registration_trusts_the_client() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;

        // No object was ever uploaded under this key.
        let res = app
            .post_with_token(
                routes::MEDIA,
                &json!({"file_name": "never-uploaded", "mime_type": "image/png"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert!(!app.store.contains("never-uploaded"));
    }

    #[tokio::test]
    async fn verified_registration_requires_the_object() {
        let app = TestApp::spawn_with(|config| config.storage.verify_uploads = true).await;
        let token = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;
        let body = json!({"file_name": "pending", "mime_type": "image/png"});

        let res = app.post_with_token(routes::MEDIA, &body, &token).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        app.store.put_object("pending", b"GIF89a".to_vec());
        let res = app.post_with_token(routes::MEDIA, &body, &token).await;
        assert_eq!(res.status, 201, "{}", res.text);
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn deleting_media_unlinks_the_recipe_and_removes_the_object() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;
        let key = app.upload_image(&token).await;
        let recipe = app.create_recipe(&token, Some(&key)).await;
        let recipe_id = recipe["id"].as_str().unwrap();

        let res = app.delete_with_token(&routes::media(&key), &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["message"], "Your image has successfully been deleted");
        assert!(app.media_row(&key).await.is_none());
        assert_eq!(app.store.delete_attempts(), vec![key.clone()]);
        assert!(!app.store.contains(&key));

        let after = app.get_without_token(&routes::recipe(recipe_id)).await;
        assert_eq!(after.status, 200);
        assert!(after.body["media_id"].is_null());
        assert!(after.body["image_url"].is_null());
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;
        let key = app.upload_image(&token).await;

        let first = app.delete_with_token(&routes::media(&key), &token).await;
        assert_eq!(first.status, 200, "{}", first.text);

        let second = app.delete_with_token(&routes::media(&key), &token).await;
        assert_eq!(second.status, 404);
        assert_eq!(second.body["code"], "NOT_FOUND");
        assert_eq!(app.store.delete_attempts().len(), 1);
    }

    #[tokio::test]
    async fn storage_failure_leaves_rows_untouched() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;
        let key = app.upload_image(&token).await;
        let recipe = app.create_recipe(&token, Some(&key)).await;
        let recipe_id = recipe["id"].as_str().unwrap();
        app.store.set_fail_deletes(true);

        let res = app.delete_with_token(&routes::media(&key), &token).await;

        assert_eq!(res.status, 500);
        assert_eq!(res.body["code"], "MEDIA_DELETE_FAILED");
        assert_eq!(res.body["message"], "Error deleting media");
        assert!(app.media_row(&key).await.is_some());

        let after = app.get_without_token(&routes::recipe(recipe_id)).await;
        assert_eq!(after.body["media_id"], key.as_str());
    }

    #[tokio::test]
    async fn only_the_owner_can_delete() {
        let app = TestApp::spawn().await;
        let owner = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;
        let other = app
            .create_authenticated_user("bob@example.com", "securepass")
            .await;
        let key = app.upload_image(&owner).await;

        let res = app.delete_with_token(&routes::media(&key), &other).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
        assert!(app.media_row(&key).await.is_some());
        assert!(app.store.delete_attempts().is_empty());
    }

    #[tokio::test]
    async fn unauthenticated_delete_changes_nothing() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("ada@example.com", "securepass")
            .await;
        let key = app.upload_image(&token).await;

        let res = app.delete_without_token(&routes::media(&key)).await;

        assert_eq!(res.status, 401);
        assert!(app.media_row(&key).await.is_some());
        assert!(app.store.delete_attempts().is_empty());
    }
}
