//! The reverse-path radix trie: one page per node, edge-split insertion,
//! lookup as the dual of insert.
//!
//! Keys are the raw bytes of a path string with its *characters* (not
//! bytes) reversed — see [`crate::container::reverse_path`]. Internally an
//! edge is treated as an opaque byte string rather than a validated `&str`:
//! a split point can land between two reversed keys that only share a
//! partial multi-byte character, so only the full root-to-leaf
//! concatenation is guaranteed to be valid UTF-8, not every intermediate
//! edge.

use uuid::Uuid;

use crate::codec::Codec;
use crate::error::{Error, Result};
use crate::page::{PageId, Pager, FLAG_TRIE, NO_PAGE};

#[derive(Debug, Clone)]
pub struct TrieNode {
    pub edge: Vec<u8>,
    pub parent_page: PageId,
    pub self_page: PageId,
    pub doc_id: Option<Uuid>,
    /// Sorted ascending by key byte; no two entries may share a byte.
    pub children: Vec<(u8, PageId)>,
}

impl TrieNode {
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(32 + self.edge.len());
        buf.extend_from_slice(&(self.edge.len() as i32).to_le_bytes());
        buf.extend_from_slice(&self.edge);
        buf.extend_from_slice(&self.parent_page.to_le_bytes());
        buf.extend_from_slice(&self.self_page.to_le_bytes());
        match self.doc_id {
            Some(id) => {
                buf.extend_from_slice(&1i32.to_le_bytes());
                buf.extend_from_slice(id.as_bytes());
            }
            None => buf.extend_from_slice(&0i32.to_le_bytes()),
        }
        buf.extend_from_slice(&(self.children.len() as i32).to_le_bytes());
        for &(byte, page) in &self.children {
            buf.push(byte);
            buf.extend_from_slice(&page.to_le_bytes());
        }
        buf
    }

    fn decode(page_id: PageId, buf: &[u8]) -> Result<Self> {
        let mut cur = Cursor { buf, pos: 0, page_id };
        let edge_len = cur.read_i32()? as usize;
        let edge = cur.read_bytes(edge_len)?.to_vec();
        let parent_page = cur.read_i64()?;
        let self_page = cur.read_i64()?;
        let has_doc = cur.read_i32()?;
        let doc_id = if has_doc != 0 {
            let bytes = cur.read_bytes(16)?;
            let arr: [u8; 16] = bytes.try_into().map_err(|_| Error::MalformedNode {
                page_id,
                reason: "truncated doc id".into(),
            })?;
            Some(Uuid::from_bytes(arr))
        } else {
            None
        };
        let child_count = cur.read_i32()? as usize;
        let mut children = Vec::with_capacity(child_count);
        for _ in 0..child_count {
            let byte = cur.read_u8()?;
            let page = cur.read_i64()?;
            children.push((byte, page));
        }
        Ok(Self { edge, parent_page, self_page, doc_id, children })
    }
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
    page_id: PageId,
}

impl<'a> Cursor<'a> {
    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.buf.len() {
            return Err(Error::MalformedNode { page_id: self.page_id, reason: "unexpected end of node".into() });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_bytes(4)?.try_into().unwrap()))
    }

    fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_bytes(8)?.try_into().unwrap()))
    }
}

fn load_node<C: Codec>(pager: &mut Pager<C>, page_id: PageId) -> Result<TrieNode> {
    let (_, payload) = pager.read_raw_page(page_id)?;
    TrieNode::decode(page_id, &payload)
}

fn write_node<C: Codec>(pager: &mut Pager<C>, node: &TrieNode) -> Result<()> {
    let bytes = node.encode();
    pager.write_raw_page(node.self_page, &bytes, FLAG_TRIE, 0, NO_PAGE, NO_PAGE)
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// A persistent reverse-path radix trie; `root_page` is `NO_PAGE` until the
/// first insert.
#[derive(Debug, Default, Clone, Copy)]
pub struct Trie {
    pub root_page: PageId,
}

impl Trie {
    #[must_use]
    pub const fn new() -> Self {
        Self { root_page: NO_PAGE }
    }

    /// Inserts `doc_id` under `reversed_key`, splitting edges as needed.
    ///
    /// A no-common-prefix insert (`c == 0` against a non-empty edge) is
    /// handled by the same split procedure as a partial match: the entire
    /// old edge (and its doc id / children) moves into a fresh child before
    /// the new suffix is attached, rather than left dangling off the old
    /// edge. Treating it as a distinct "attach directly" case would orphan
    /// previously inserted documents whenever a new key's first byte
    /// disagreed with an existing non-empty edge — every inserted path must
    /// remain resolvable.
    pub fn insert<C: Codec>(&mut self, pager: &mut Pager<C>, reversed_key: &[u8], doc_id: Uuid) -> Result<()> {
        if reversed_key.is_empty() {
            return Err(Error::EmptyPath);
        }
        if self.root_page == NO_PAGE {
            let root_id = pager.allocate_page();
            let root = TrieNode { edge: Vec::new(), parent_page: NO_PAGE, self_page: root_id, doc_id: None, children: Vec::new() };
            write_node(pager, &root)?;
            self.root_page = root_id;
        }

        let mut current_id = self.root_page;
        let mut remaining: Vec<u8> = reversed_key.to_vec();

        loop {
            let mut current = load_node(pager, current_id)?;
            let c = common_prefix_len(&remaining, &current.edge);

            if c == current.edge.len() {
                if c == remaining.len() {
                    current.doc_id = Some(doc_id);
                    write_node(pager, &current)?;
                    return Ok(());
                }
                let after = remaining[c..].to_vec();
                let k = after[0];
                if let Some(&(_, child_page)) = current.children.iter().find(|&(b, _)| *b == k) {
                    current_id = child_page;
                    remaining = after[1..].to_vec();
                    continue;
                }
                attach_leaf(pager, &mut current, current_id, k, after[1..].to_vec(), doc_id)?;
                return Ok(());
            }

            // 0 <= c < current.edge.len(): split the edge at c.
            let split_byte = current.edge[c];
            let suffix_page = pager.allocate_page();
            let suffix = TrieNode {
                edge: current.edge[c + 1..].to_vec(),
                parent_page: current_id,
                self_page: suffix_page,
                doc_id: current.doc_id.take(),
                children: std::mem::take(&mut current.children),
            };
            write_node(pager, &suffix)?;

            current.edge.truncate(c);
            current.children = vec![(split_byte, suffix_page)];

            let after = remaining[c..].to_vec();
            if after.is_empty() {
                current.doc_id = Some(doc_id);
                write_node(pager, &current)?;
                return Ok(());
            }
            let k = after[0];
            attach_leaf(pager, &mut current, current_id, k, after[1..].to_vec(), doc_id)?;
            return Ok(());
        }
    }

    /// Walks `reversed_key` from the root; returns the terminating node's
    /// `doc_id`, or `None` if the key was never inserted.
    pub fn lookup<C: Codec>(&self, pager: &mut Pager<C>, reversed_key: &[u8]) -> Result<Option<Uuid>> {
        if self.root_page == NO_PAGE || reversed_key.is_empty() {
            return Ok(None);
        }
        let mut current_id = self.root_page;
        let mut remaining: Vec<u8> = reversed_key.to_vec();

        loop {
            let current = load_node(pager, current_id)?;
            let c = common_prefix_len(&remaining, &current.edge);
            if c != current.edge.len() {
                return Ok(None);
            }
            if c == remaining.len() {
                return Ok(current.doc_id);
            }
            let after = &remaining[c..];
            let k = after[0];
            match current.children.iter().find(|(b, _)| *b == k) {
                Some(&(_, child_page)) => {
                    current_id = child_page;
                    remaining = after[1..].to_vec();
                }
                None => return Ok(None),
            }
        }
    }

    /// Resolves every document whose reversed key begins with
    /// `reversed_prefix` (a suffix or filename-tail query in forward-path
    /// terms), realizing the lookup mode the reverse trie exists for.
    pub fn resolve_prefix<C: Codec>(&self, pager: &mut Pager<C>, reversed_prefix: &[u8]) -> Result<Vec<Uuid>> {
        let mut out = Vec::new();
        if self.root_page == NO_PAGE || reversed_prefix.is_empty() {
            return Ok(out);
        }
        let mut current_id = self.root_page;
        let mut remaining: &[u8] = reversed_prefix;

        loop {
            let current = load_node(pager, current_id)?;
            let c = common_prefix_len(remaining, &current.edge);
            if c == remaining.len() {
                // The whole query is consumed within (or exactly at) this edge:
                // everything at or below `current` matches the prefix.
                collect_subtree(pager, current_id, &mut out)?;
                return Ok(out);
            }
            if c != current.edge.len() {
                return Ok(out);
            }
            let after = &remaining[c..];
            let k = after[0];
            match current.children.iter().find(|(b, _)| *b == k) {
                Some(&(_, child_page)) => {
                    current_id = child_page;
                    remaining = &after[1..];
                }
                None => return Ok(out),
            }
        }
    }
}

fn attach_leaf<C: Codec>(
    pager: &mut Pager<C>,
    current: &mut TrieNode,
    current_id: PageId,
    key_byte: u8,
    child_edge: Vec<u8>,
    doc_id: Uuid,
) -> Result<()> {
    let new_page = pager.allocate_page();
    // `child_edge` is, by construction, everything left of the key after
    // consuming `key_byte`: a freshly created leaf always terminates the
    // insert, regardless of how many bytes its edge spans.
    let child = TrieNode { edge: child_edge, parent_page: current_id, self_page: new_page, doc_id: Some(doc_id), children: Vec::new() };
    write_node(pager, &child)?;
    current.children.push((key_byte, new_page));
    current.children.sort_by_key(|&(b, _)| b);
    write_node(pager, current)
}

fn collect_subtree<C: Codec>(pager: &mut Pager<C>, page_id: PageId, out: &mut Vec<Uuid>) -> Result<()> {
    let node = load_node(pager, page_id)?;
    if let Some(id) = node.doc_id {
        out.push(id);
    }
    for (_, child_page) in node.children.clone() {
        collect_subtree(pager, child_page, out)?;
    }
    Ok(())
}
