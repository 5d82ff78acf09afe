//! URL frontier for the crawl loop
//!
//! A FIFO queue of (url, depth) jobs with a visited set and a global page
//! cap. URLs are reserved in the visited set the moment they are enqueued,
//! so a page linked from many places is only ever queued once.

use std::collections::{HashSet, VecDeque};

/// One unit of crawl work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlJob {
    pub url: String,
    pub depth: u32,
}

/// Breadth-first work queue with deduplication and a page budget
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<CrawlJob>,
    visited: HashSet<String>,
    processed_count: usize,
    max_depth: u32,
    max_pages: usize,
}

impl Frontier {
    pub fn new(max_depth: u32, max_pages: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            visited: HashSet::new(),
            processed_count: 0,
            max_depth,
            max_pages,
        }
    }

    /// Enqueues a URL if it is unseen, within depth and within the page budget
    ///
    /// # Returns
    ///
    /// * `true` - The URL was reserved and queued
    /// * `false` - The URL was rejected
    pub fn add(&mut self, url: &str, depth: u32) -> bool {
        if depth > self.max_depth || self.visited.len() >= self.max_pages {
            return false;
        }

        if !self.visited.insert(url.to_string()) {
            return false;
        }

        self.queue.push_back(CrawlJob {
            url: url.to_string(),
            depth,
        });
        true
    }

    /// Removes the earliest-enqueued job
    pub fn pop(&mut self) -> Option<CrawlJob> {
        self.queue.pop_front()
    }

    /// True once the queue is drained or the page budget is spent
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty() || self.processed_count >= self.max_pages
    }

    /// Records that a popped job finished, whatever its outcome
    pub fn mark_processed(&mut self) {
        self.processed_count += 1;
    }

    pub fn processed_count(&self) -> usize {
        self.processed_count
    }

    /// Whether the URL has been reserved by an earlier `add`
    pub fn is_reserved(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Number of jobs waiting in the queue
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }
}
