//! Property tests for in-memory vector store query ordering.

use std::collections::HashMap;

use kisaan_rag::document::Chunk;
use kisaan_rag::inmemory::InMemoryVectorStore;
use kisaan_rag::vectorstore::VectorStore;
use proptest::prelude::*;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

/// Generate a chunk with a normalized embedding.
fn arb_chunk(dim: usize) -> impl Strategy<Value = Chunk> {
    ("[a-z]{3,8}", "[a-z ]{5,30}", arb_normalized_embedding(dim)).prop_map(
        |(id, text, embedding)| Chunk {
            id,
            text,
            embedding,
            metadata: HashMap::new(),
            document_id: "doc_1".to_string(),
        },
    )
}

/// For any set of chunks with embeddings stored in an InMemoryVectorStore,
/// querying with an embedding returns results ordered by descending cosine
/// similarity, and the number of results is at most top_k.
mod prop_inmemory_query_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_descending_and_bounded_by_top_k(
            chunks in proptest::collection::vec(arb_chunk(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            top_k in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let results = rt.block_on(async {
                let store = InMemoryVectorStore::new();
                store.ensure_index("test", DIM).await.unwrap();

                // Deduplicate chunks by id to avoid upsert overwriting
                let mut deduped: HashMap<String, Chunk> = HashMap::new();
                for chunk in &chunks {
                    deduped.entry(chunk.id.clone()).or_insert_with(|| chunk.clone());
                }
                let unique_chunks: Vec<Chunk> = deduped.into_values().collect();
                let count = unique_chunks.len();

                store.upsert("test", &unique_chunks).await.unwrap();
                let results = store.query("test", &query, top_k).await.unwrap();
                (results, count)
            });

            let (results, unique_count) = results;

            // Result count is at most top_k and at most the number of stored chunks
            prop_assert!(results.len() <= top_k);
            prop_assert!(results.len() <= unique_count);

            // Results are ordered by descending score
            for window in results.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "results not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
            }
        }
    }
}

mod unit {
    use super::*;

    fn chunk(id: &str, embedding: Vec<f32>) -> Chunk {
        Chunk {
            id: id.to_string(),
            text: format!("text for {id}"),
            embedding,
            metadata: HashMap::new(),
            document_id: "doc_1".to_string(),
        }
    }

    #[tokio::test]
    async fn ensure_index_is_idempotent() {
        let store = InMemoryVectorStore::new();
        store.ensure_index("general-query", 3).await.unwrap();
        store.upsert("general-query", &[chunk("a", vec![1.0, 0.0, 0.0])]).await.unwrap();

        // A second ensure_index does not wipe existing data.
        store.ensure_index("general-query", 3).await.unwrap();
        let results = store.query("general-query", &[1.0, 0.0, 0.0], 3).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.id, "a");
    }

    #[tokio::test]
    async fn upsert_overwrites_same_id() {
        let store = InMemoryVectorStore::new();
        store.ensure_index("general-query", 3).await.unwrap();

        store.upsert("general-query", &[chunk("a", vec![1.0, 0.0, 0.0])]).await.unwrap();
        store.upsert("general-query", &[chunk("a", vec![0.0, 1.0, 0.0])]).await.unwrap();

        let results = store.query("general-query", &[0.0, 1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn query_unknown_index_is_an_error() {
        let store = InMemoryVectorStore::new();
        let result = store.query("missing", &[1.0], 3).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn query_ranks_closest_first() {
        let store = InMemoryVectorStore::new();
        store.ensure_index("general-query", 2).await.unwrap();
        store
            .upsert(
                "general-query",
                &[
                    chunk("east", vec![1.0, 0.0]),
                    chunk("north", vec![0.0, 1.0]),
                    chunk("northeast", vec![0.7071, 0.7071]),
                ],
            )
            .await
            .unwrap();

        let results = store.query("general-query", &[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.id, "east");
        assert_eq!(results[1].chunk.id, "northeast");
    }
}
