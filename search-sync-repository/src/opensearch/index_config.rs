//! OpenSearch index settings and field mappings.
//!
//! One mapping document per stream. Embedded snapshots are mapped as
//! `nested` so queries over `{id, name}` pairs match within a single
//! snapshot instead of across the whole array.

use search_sync_shared::StreamKind;
use serde_json::{json, Value};

/// Settings and mappings for a stream's index.
///
/// # Sharding Configuration
///
/// - 1 primary shard
/// - 1 replica for redundancy
pub fn index_settings(stream: StreamKind) -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "mappings": {
            "properties": mapping_properties(stream)
        }
    })
}

fn mapping_properties(stream: StreamKind) -> Value {
    match stream {
        StreamKind::Works => json!({
            "id": {
                "type": "keyword"
            },
            "title": {
                "type": "text",
                "fields": {
                    "raw": {
                        "type": "keyword"
                    }
                }
            },
            "description": {
                "type": "text"
            },
            "rating": {
                "type": "float"
            },
            "modified": {
                "type": "date"
            },
            "categories": {
                "type": "nested",
                "properties": {
                    "id": { "type": "keyword" },
                    "name": { "type": "text" }
                }
            },
            "directors": {
                "type": "nested",
                "properties": {
                    "id": { "type": "keyword" },
                    "name": { "type": "text" }
                }
            },
            "actors": {
                "type": "nested",
                "properties": {
                    "id": { "type": "keyword" },
                    "name": { "type": "text" }
                }
            },
            "writers": {
                "type": "nested",
                "properties": {
                    "id": { "type": "keyword" },
                    "name": { "type": "text" }
                }
            }
        }),
        StreamKind::People => json!({
            "id": {
                "type": "keyword"
            },
            "full_name": {
                "type": "text",
                "fields": {
                    "raw": {
                        "type": "keyword"
                    }
                }
            },
            "modified": {
                "type": "date"
            },
            "films": {
                "type": "nested",
                "properties": {
                    "id": { "type": "keyword" },
                    "roles": { "type": "keyword" }
                }
            }
        }),
        StreamKind::Categories => json!({
            "id": {
                "type": "keyword"
            },
            "name": {
                "type": "text",
                "fields": {
                    "raw": {
                        "type": "keyword"
                    }
                }
            },
            "modified": {
                "type": "date"
            }
        }),
    }
}
