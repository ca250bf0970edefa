// src/config/consts.rs

// Net config
pub const BASE_URL: &str = "https://piltoverarchive.com";
pub const SEARCH_PATH: &str = "/api/trpc/cards.search";
pub const TIMEOUT_SECS: u64 = 30;
pub const USER_AGENT: &str = "rift_scrape/0.3 (+reqwest)";

// Local data
pub const STORE_DIR: &str = ".store";
pub const DEFAULT_DATA_DIR: &str = "card_data";
pub const SNAPSHOT_FILE: &str = "cards.json";
pub const BACKUP_SUFFIX: &str = "_backup";

/// Built-in sets: (key, prefix, catalog file)
pub const DEFAULT_SETS: &[(&str, &str, &str)] = &[
    ("origins", "OGN", "riftbound_origins.json"),
    ("proving_grounds", "OGS", "riftbound_proving_grounds.json"),
];

// Snapshot metadata
pub const SNAPSHOT_SOURCE: &str = "Piltover Archive";
pub const SNAPSHOT_DESCRIPTION: &str = "Riftbound cards sorted by variant number";
