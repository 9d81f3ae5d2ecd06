pub mod handlers;
pub mod loader;
pub mod trie;

pub use handlers::{AppState, router};
pub use loader::{LoadStats, ParaphraseStore, build_trie, try_build_trie};
pub use trie::{Match, TransformationTrie, TrieError, TrieNode};
