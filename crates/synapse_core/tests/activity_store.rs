use synapse_core::db::open_db;
use synapse_core::{
    build_graph, ActivityStore, EdgeKind, ForceLayout, NodeGroup, NoteDraft, NoteRecord, NoteType,
    SqliteKvStore, ACTIVITY_LIMIT,
};

fn note(title: &str, category: &str, content: &str) -> NoteRecord {
    let draft = NoteDraft::new(NoteType::Text, content)
        .with_title(title)
        .with_category(category);
    NoteRecord::from_draft(&draft, "1234").unwrap()
}

#[test]
fn file_backed_store_evicts_oldest_and_reloads_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("synapse.sqlite3");
    let mut added = Vec::new();

    {
        let conn = open_db(&path).unwrap();
        let mut store = ActivityStore::load(SqliteKvStore::new(&conn)).unwrap();
        for index in 0..15 {
            let record = note(&format!("n{index}"), "c", "body");
            added.push(record.id);
            store.add(record).unwrap();
            assert!(store.len() <= ACTIVITY_LIMIT);
        }
        store.patch_latest("latest summary", Some("work")).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let store = ActivityStore::load(SqliteKvStore::new(&conn)).unwrap();
    let ids: Vec<_> = store.all().iter().map(|r| r.id).collect();
    let expected: Vec<_> = added.iter().rev().take(ACTIVITY_LIMIT).copied().collect();
    assert_eq!(ids, expected);
    assert_eq!(store.all()[0].summary.as_deref(), Some("latest summary"));
    assert_eq!(store.all()[0].category, "work");
    for evicted in &added[..5] {
        assert!(store.get(*evicted).is_none());
    }
}

#[test]
fn graph_view_consumes_store_contents() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("g.sqlite3")).unwrap();
    let mut store = ActivityStore::load(SqliteKvStore::new(&conn)).unwrap();
    store.add(note("B", "X", "plain")).unwrap();
    store.add(note("A", "X", "links to [[B]] and [[Missing]]")).unwrap();

    let graph = build_graph(store.all());
    assert_eq!(graph.nodes_in(NodeGroup::Note).count(), 2);
    assert_eq!(graph.nodes_in(NodeGroup::Category).count(), 1);
    assert_eq!(graph.edges_of(EdgeKind::Membership).count(), 2);
    let direct: Vec<_> = graph.edges_of(EdgeKind::Direct).collect();
    assert_eq!(direct.len(), 1);
    assert_eq!(graph.node(&direct[0].source).unwrap().title, "A");
    assert_eq!(graph.node(&direct[0].target).unwrap().title, "B");

    let mut layout = ForceLayout::new(640.0, 480.0);
    layout.update(store.all());
    layout.run(500);
    assert_eq!(layout.positions().len(), 3);
    assert_eq!(layout.graph(), &graph);
}
