use crate::geom::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathRequest {
    pub start: Cell,
    pub end: Cell,
}

impl PathRequest {
    pub fn new(start: Cell, end: Cell) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPath {
    pub request: PathRequest,
    pub path: Vec<Cell>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathCacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Single-slot memo of the last request. Validity is keyed on the request
/// alone; grid contents are not part of the key.
#[derive(Debug, Clone, Default)]
pub(crate) struct PathCache {
    entry: Option<CachedPath>,
    stats: PathCacheStats,
}

impl PathCache {
    pub(crate) fn lookup(&mut self, request: PathRequest) -> Option<&[Cell]> {
        match &self.entry {
            Some(cached) if cached.request == request => {
                self.stats.hits = self.stats.hits.saturating_add(1);
                Some(cached.path.as_slice())
            }
            _ => {
                self.stats.misses = self.stats.misses.saturating_add(1);
                None
            }
        }
    }

    pub(crate) fn store(&mut self, request: PathRequest, path: Vec<Cell>) {
        self.entry = Some(CachedPath { request, path });
    }

    pub(crate) fn entry(&self) -> Option<&CachedPath> {
        self.entry.as_ref()
    }

    pub(crate) fn stats(&self) -> PathCacheStats {
        self.stats
    }
}
