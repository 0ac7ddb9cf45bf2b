//! Breadth-first crawl frontier for a single origin
//!
//! The frontier owns the pending queue and the visited set. Both are only
//! touched from the sequential crawl loop, so no locking is involved.

use crate::url::Origin;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// FIFO queue of origin URLs awaiting a visit, plus the set already visited
#[derive(Debug, Clone)]
pub struct Frontier {
    origin: Origin,

    /// URLs awaiting a visit, in discovery order
    queue: VecDeque<Url>,

    /// Keys of everything currently in `queue`
    pending: HashSet<String>,

    /// Keys of every URL that has been dequeued for processing
    visited: HashSet<String>,
}

/// Identity of a URL within the frontier; fragments never distinguish pages
fn frontier_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.into()
}

impl Frontier {
    pub fn new(origin: Origin) -> Self {
        Self {
            origin,
            queue: VecDeque::new(),
            pending: HashSet::new(),
            visited: HashSet::new(),
        }
    }

    /// Creates a frontier seeded with the origin root
    pub fn seeded(origin: Origin) -> Self {
        let root = origin.root().clone();
        let mut frontier = Self::new(origin);
        frontier.enqueue_url(&root);
        frontier
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Parses and enqueues a URL
    ///
    /// # Returns
    ///
    /// `true` if the URL was appended; `false` if it does not parse, lies
    /// outside the origin, was already visited, or is already pending.
    pub fn enqueue(&mut self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(url) => self.enqueue_url(&url),
            Err(_) => false,
        }
    }

    /// Enqueues an already parsed URL under the same rules as [`Frontier::enqueue`]
    pub fn enqueue_url(&mut self, url: &Url) -> bool {
        if !self.origin.contains(url) {
            return false;
        }

        let key = frontier_key(url);
        if self.visited.contains(&key) || self.pending.contains(&key) {
            return false;
        }

        let mut url = url.clone();
        url.set_fragment(None);
        self.pending.insert(key);
        self.queue.push_back(url);
        true
    }

    /// Pops the oldest pending URL
    pub fn dequeue_next(&mut self) -> Option<Url> {
        let url = self.queue.pop_front()?;
        self.pending.remove(url.as_str());
        Some(url)
    }

    /// Records a URL as visited; idempotent
    ///
    /// # Returns
    ///
    /// `true` if the URL had not been visited before.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(frontier_key(url))
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(&frontier_key(url))
    }

    pub fn is_pending(&self, url: &Url) -> bool {
        self.pending.contains(&frontier_key(url))
    }

    /// Pending URLs in the order they will be visited
    pub fn pending(&self) -> impl Iterator<Item = &Url> {
        self.queue.iter()
    }

    /// Number of pending URLs
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frontier() -> Frontier {
        Frontier::new(Origin::parse("https://am.ndhu.edu.tw/").unwrap())
    }

    #[test]
    fn test_seeded_with_root() {
        let mut frontier = Frontier::seeded(Origin::parse("https://am.ndhu.edu.tw/").unwrap());
        assert_eq!(frontier.len(), 1);
        assert_eq!(
            frontier.dequeue_next().unwrap().as_str(),
            "https://am.ndhu.edu.tw/"
        );
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = frontier();
        assert!(frontier.enqueue("https://am.ndhu.edu.tw/a"));
        assert!(frontier.enqueue("https://am.ndhu.edu.tw/b"));
        assert!(frontier.enqueue("https://am.ndhu.edu.tw/c"));

        let order: Vec<String> = std::iter::from_fn(|| frontier.dequeue_next())
            .map(|u| u.path().to_string())
            .collect();
        assert_eq!(order, vec!["/a", "/b", "/c"]);
        assert!(frontier.dequeue_next().is_none());
    }

    #[test]
    fn test_rejects_foreign_hosts() {
        let mut frontier = frontier();
        assert!(!frontier.enqueue("https://www.ndhu.edu.tw/"));
        assert!(!frontier.enqueue("https://evil.example/am.ndhu.edu.tw"));
        assert!(!frontier.enqueue("not a url"));
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_rejects_pending_duplicate() {
        let mut frontier = frontier();
        assert!(frontier.enqueue("https://am.ndhu.edu.tw/a"));
        assert!(!frontier.enqueue("https://am.ndhu.edu.tw/a"));
        assert!(!frontier.enqueue("https://am.ndhu.edu.tw/a#section"));
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_rejects_visited() {
        let mut frontier = frontier();
        frontier.enqueue("https://am.ndhu.edu.tw/a");
        let url = frontier.dequeue_next().unwrap();
        assert!(frontier.mark_visited(&url));

        assert!(!frontier.enqueue("https://am.ndhu.edu.tw/a"));
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_mark_visited_is_idempotent() {
        let mut frontier = frontier();
        let url = Url::parse("https://am.ndhu.edu.tw/a").unwrap();
        assert!(frontier.mark_visited(&url));
        assert!(!frontier.mark_visited(&url));
        assert_eq!(frontier.visited_count(), 1);
        assert!(frontier.is_visited(&url));
    }

    #[test]
    fn test_dequeue_clears_pending() {
        let mut frontier = frontier();
        frontier.enqueue("https://am.ndhu.edu.tw/a?Lang=zh-tw");
        let url = frontier.dequeue_next().unwrap();
        assert!(!frontier.is_pending(&url));
        assert_eq!(frontier.pending().count(), 0);
    }
}
