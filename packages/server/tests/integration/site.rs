use crate::common::{TestApp, routes};

mod project_routes {
    use super::*;

    #[tokio::test]
    async fn serves_a_stored_file_with_its_content_type() {
        let app = TestApp::spawn().await;
        app.seed(
            "users/alice/blog/main.css",
            b"body { margin: 0 }",
            "text/css",
        )
        .await;

        let res = app.get(&routes::site("alice", "blog", "main.css")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.content_type, "text/css");
        assert_eq!(res.text, "body { margin: 0 }");
    }

    #[tokio::test]
    async fn serves_index_for_the_bare_project_path() {
        let app = TestApp::spawn().await;
        app.seed(
            "users/alice/blog/index.html",
            b"<html>home</html>",
            "text/html",
        )
        .await;

        let res = app.get("/site/alice/blog").await;
        assert_eq!(res.status, 200);
        assert_eq!(res.text, "<html>home</html>");

        let res = app.get("/site/alice/blog/").await;
        assert_eq!(res.status, 200);
        assert_eq!(res.text, "<html>home</html>");
    }

    #[tokio::test]
    async fn malformed_paths_are_plain_404s() {
        let app = TestApp::spawn().await;
        app.seed(
            "users/alice/blog/index.html",
            b"<html>home</html>",
            "text/html",
        )
        .await;

        // An empty segment never reaches storage as a valid key; the
        // response is still a plain 404, not a server error.
        let res = app.get("/site/alice/blog/a//b.css").await;
        assert_eq!(res.status, 404);
        assert_eq!(res.text, "not found");

        // Extensionless malformed paths do not get the SPA fallback.
        let res = app.get("/site/alice/blog/a//b").await;
        assert_eq!(res.status, 404);
        assert_eq!(res.text, "not found");
    }

    #[tokio::test]
    async fn missing_project_returns_404() {
        let app = TestApp::spawn().await;

        let res = app.get("/site/alice/blog").await;

        assert_eq!(res.status, 404);
        assert_eq!(res.text, "not found");
    }
}

mod spa_fallback {
    use super::*;

    #[tokio::test]
    async fn extensionless_miss_falls_back_to_the_index_document() {
        let app = TestApp::spawn().await;
        app.seed(
            "users/alice/blog/index.html",
            b"<html>app shell</html>",
            "text/html",
        )
        .await;

        let res = app.get(&routes::site("alice", "blog", "about")).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.content_type, "text/html");
        assert_eq!(res.text, "<html>app shell</html>");

        // Nested client-side routes fall back too.
        let res = app.get(&routes::site("alice", "blog", "posts/2024/hello")).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.text, "<html>app shell</html>");
    }

    #[tokio::test]
    async fn extensioned_miss_is_a_plain_404_without_fallback() {
        let app = TestApp::spawn().await;
        app.seed(
            "users/alice/blog/index.html",
            b"<html>app shell</html>",
            "text/html",
        )
        .await;

        let res = app.get(&routes::site("alice", "blog", "missing.js")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.text, "not found");
    }

    #[tokio::test]
    async fn extensionless_miss_with_no_index_is_404() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::site("alice", "blog", "about")).await;

        assert_eq!(res.status, 404);
    }
}

mod fixed_routes {
    use super::*;

    #[tokio::test]
    async fn root_serves_the_default_scope_index() {
        let app = TestApp::spawn().await;
        app.seed("users/anon/demo/index.html", b"<html>demo</html>", "text/html")
            .await;

        let res = app.get("/").await;

        assert_eq!(res.status, 200);
        assert_eq!(res.text, "<html>demo</html>");
    }

    #[tokio::test]
    async fn static_and_assets_resolve_under_the_default_scope() {
        let app = TestApp::spawn().await;
        app.seed(
            "users/anon/demo/static/app.js",
            b"console.log(1)",
            "application/javascript",
        )
        .await;
        app.seed("users/anon/demo/assets/logo.svg", b"<svg/>", "image/svg+xml")
            .await;

        let res = app.get("/static/app.js").await;
        assert_eq!(res.status, 200);
        assert_eq!(res.content_type, "application/javascript");

        let res = app.get("/assets/logo.svg").await;
        assert_eq!(res.status, 200);
        assert_eq!(res.content_type, "image/svg+xml");
    }

    #[tokio::test]
    async fn manifest_and_root_files_resolve_under_the_default_scope() {
        let app = TestApp::spawn().await;
        app.seed(
            "users/anon/demo/manifest.json",
            br#"{"name":"demo"}"#,
            "application/json",
        )
        .await;
        app.seed("users/anon/demo/favicon.ico", b"icon", "image/x-icon")
            .await;

        let res = app.get("/manifest.json").await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["name"], "demo");

        let res = app.get("/favicon.ico").await;
        assert_eq!(res.status, 200);
        assert_eq!(res.content_type, "image/x-icon");
    }

    #[tokio::test]
    async fn extensionless_root_segments_are_not_served() {
        let app = TestApp::spawn().await;
        app.seed("users/anon/demo/about", b"raw", "application/octet-stream")
            .await;

        let res = app.get("/about").await;

        assert_eq!(res.status, 404);
    }
}
