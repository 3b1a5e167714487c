use std::fs::OpenOptions;

use uuid::Uuid;

use streamdb::codec::NullCodec;
use streamdb::page::Pager;
use streamdb::trie::Trie;

fn open_pager(dir: &std::path::Path, name: &str) -> Pager<NullCodec> {
    let path = dir.join(name);
    let file = OpenOptions::new().read(true).write(true).create(true).truncate(true).open(path).unwrap();
    Pager::new(file, NullCodec, false)
}

fn reversed(path: &str) -> Vec<u8> {
    path.chars().rev().collect::<String>().into_bytes()
}

#[test]
fn inserted_paths_resolve_and_unknown_keys_miss() {
    let dir = tempfile::tempdir().unwrap();
    let mut pager = open_pager(dir.path(), "trie.sdb");
    let mut trie = Trie::new();

    let id_a = Uuid::new_v4();
    let id_b = Uuid::new_v4();
    trie.insert(&mut pager, &reversed("foo/bar"), id_a).unwrap();
    trie.insert(&mut pager, &reversed("foo/baz"), id_b).unwrap();

    assert_eq!(trie.lookup(&mut pager, &reversed("foo/bar")).unwrap(), Some(id_a));
    assert_eq!(trie.lookup(&mut pager, &reversed("foo/baz")).unwrap(), Some(id_b));
    assert_eq!(trie.lookup(&mut pager, &reversed("foo/nope")).unwrap(), None);
}

/// "foo/bar", "foo/baz", and "foo/barn" reverse to keys that share no
/// common first byte, so no edge split occurs here (see DESIGN.md). The
/// three distinct, collision-free, resolvable leaves still hold.
#[test]
fn three_path_scenario_yields_distinct_resolvable_leaves() {
    let dir = tempfile::tempdir().unwrap();
    let mut pager = open_pager(dir.path(), "trie.sdb");
    let mut trie = Trie::new();

    let paths = ["foo/bar", "foo/baz", "foo/barn"];
    let ids: Vec<Uuid> = paths.iter().map(|_| Uuid::new_v4()).collect();
    for (path, id) in paths.iter().zip(&ids) {
        trie.insert(&mut pager, &reversed(path), *id).unwrap();
    }
    for (path, id) in paths.iter().zip(&ids) {
        assert_eq!(trie.lookup(&mut pager, &reversed(path)).unwrap(), Some(*id));
    }
    assert_eq!(ids.iter().collect::<std::collections::HashSet<_>>().len(), 3);
}

#[test]
fn mid_edge_divergence_forces_a_genuine_split() {
    let dir = tempfile::tempdir().unwrap();
    let mut pager = open_pager(dir.path(), "trie.sdb");
    let mut trie = Trie::new();

    let id_a = Uuid::new_v4();
    let id_b = Uuid::new_v4();
    // Reversed: "gnp.oof/serutxet" and "gnp.2oof/serutxet" — share "gnp."
    // then diverge, forcing a split partway through the first leaf's edge.
    trie.insert(&mut pager, &reversed("textures/foo.png"), id_a).unwrap();
    trie.insert(&mut pager, &reversed("textures/foo2.png"), id_b).unwrap();

    assert_eq!(trie.lookup(&mut pager, &reversed("textures/foo.png")).unwrap(), Some(id_a));
    assert_eq!(trie.lookup(&mut pager, &reversed("textures/foo2.png")).unwrap(), Some(id_b));
    assert_eq!(trie.lookup(&mut pager, &reversed("textures/foo3.png")).unwrap(), None);
}

#[test]
fn duplicate_insert_overwrites_the_doc_id_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let mut pager = open_pager(dir.path(), "trie.sdb");
    let mut trie = Trie::new();
    let key = b"abc";
    let id1 = Uuid::new_v4();
    let id2 = Uuid::new_v4();
    trie.insert(&mut pager, key, id1).unwrap();
    trie.insert(&mut pager, key, id2).unwrap();
    assert_eq!(trie.lookup(&mut pager, key).unwrap(), Some(id2));
}

#[test]
fn empty_key_insertion_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut pager = open_pager(dir.path(), "trie.sdb");
    let mut trie = Trie::new();
    let err = trie.insert(&mut pager, b"", Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, streamdb::Error::EmptyPath));
}

#[test]
fn unicode_path_round_trips_through_the_trie() {
    let dir = tempfile::tempdir().unwrap();
    let mut pager = open_pager(dir.path(), "trie.sdb");
    let mut trie = Trie::new();
    let id = Uuid::new_v4();
    let key = reversed("textures/wáll.dds");
    trie.insert(&mut pager, &key, id).unwrap();
    assert_eq!(trie.lookup(&mut pager, &key).unwrap(), Some(id));
}
