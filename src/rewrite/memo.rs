use std::collections::HashMap;

use crate::expr::Expr;

/// Maps original nodes to their replacements by node identity.
///
/// Keys are node addresses. The memo holds a handle to every original node it
/// records, so an address cannot be freed and reused while the memo is alive.
#[derive(Debug, Default)]
pub struct IdentityMemo {
    entries: Vec<(Expr, Expr)>,
    index: HashMap<usize, usize>,
}

impl IdentityMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, original: &Expr) -> Option<&Expr> {
        self.index.get(&original.addr()).map(|&i| &self.entries[i].1)
    }

    /// Record `replacement` for `original`. A node is recorded at most once;
    /// later records for the same node are ignored.
    pub fn record(&mut self, original: &Expr, replacement: Expr) {
        let addr = original.addr();
        if self.index.contains_key(&addr) {
            return;
        }
        self.index.insert(addr, self.entries.len());
        self.entries.push((original.clone(), replacement));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(original, replacement)` pairs in recording order.
    pub fn iter(&self) -> impl Iterator<Item = (&Expr, &Expr)> {
        self.entries.iter().map(|(o, r)| (o, r))
    }
}
