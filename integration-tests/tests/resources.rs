//! Resource tree traversal against a real fixture tree

use integration_tests::session;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use strand_test_support::TestProject;

#[tokio::test]
async fn all_resources_visits_every_resource_exactly_once() {
    let project = TestProject::new();
    project.create_dir("a");
    project.write_file("a/b.py", "");
    project.write_file("c.py", "");
    let session = session(&project);

    let resources = session.list_all_resources().await.unwrap();
    let visited: HashSet<(String, bool)> = resources
        .iter()
        .map(|r| (r.path.clone(), r.is_folder))
        .collect();

    assert_eq!(visited.len(), resources.len(), "no duplicates");
    assert_eq!(
        visited,
        HashSet::from([
            ("a".to_string(), true),
            ("a/b.py".to_string(), false),
            ("c.py".to_string(), false),
        ])
    );
}

#[tokio::test]
async fn traversal_is_breadth_first() {
    let project = TestProject::new();
    project.write_file("a/deep/leaf.py", "");
    project.write_file("b.py", "");
    let session = session(&project);

    let paths: Vec<String> = session
        .list_all_resources()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.path)
        .collect();

    assert_eq!(paths, vec!["a", "b.py", "a/deep", "a/deep/leaf.py"]);
}

#[tokio::test]
async fn children_accept_absolute_and_relative_paths() {
    let project = TestProject::new();
    project.write_file("pkg/mod.py", "");
    let session = session(&project);

    let relative = session.list_children("pkg").await.unwrap();
    let absolute = session
        .list_children(&session.project_root().join("pkg").display().to_string())
        .await
        .unwrap();

    assert_eq!(relative, absolute);
    assert_eq!(relative.len(), 1);
    assert_eq!(relative[0].path, "pkg/mod.py");
    assert!(!relative[0].is_folder);
}

#[tokio::test]
async fn listing_children_of_a_missing_folder_fails() {
    let project = TestProject::new();
    let session = session(&project);
    let err = session.list_children("ghost").await.unwrap_err();
    assert_eq!(err.category(), "not_found");
}
