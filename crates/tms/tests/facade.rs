#![allow(clippy::unwrap_used)]

use std::time::Duration;

use tms::prelude::*;

#[test]
fn prelude_is_enough_to_build_a_router() {
    let cfg = tms::server::config::load_from_str(
        r#"
version: 1
auth:
  jwt_secret: "facade-test-secret-0123456789"
"#,
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let store = Store::open_path(dir.path().join("tms.db"), Duration::from_secs(1)).unwrap();
    {
        let conn = store.connect().unwrap();
        let repo = Repository::new(&conn);
        let id = repo
            .create_project(&NewProject {
                id: None,
                name: "Facade".into(),
                responsible_name: "nobody".into(),
                status: "active".into(),
                completion_date: None,
            })
            .unwrap();
        assert_eq!(repo.get_project(id).unwrap().name, "Facade");
    }

    let state = AppState::new(cfg, store).unwrap();
    let _router = build_router(state);
}
