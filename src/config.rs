// IMPORTANT:
// Keep ALL numeric values centralized here (no hardcoded numeric values scattered around).

// NOTE: CRATE_VERSION must stay in sync with the `version` field in Cargo.toml.
pub const CRATE_VERSION: &str = "0.1.0";

pub mod tokenizer {
    pub const CLS_TOKEN: &str = "[CLS]";
    pub const SEP_TOKEN: &str = "[SEP]";
    pub const UNKNOWN_TOKEN: &str = "[UNK]";

    // WordPiece continuation marker for pieces that do not start a word.
    pub const CONTINUATION_PREFIX: &str = "##";

    // Words longer than this (in chars) become a single unknown token.
    pub const MAX_INPUT_CHARS_PER_WORD: usize = 200;

    // Padding positions carry id 0, type 0, mask 0.
    pub const PAD_ID: i64 = 0;
}

pub mod embedding {
    pub const EMBEDDING_DIMS: usize = 384;
    pub const EMBEDDING_MODEL_NAME: &str = "all-MiniLM-L6-v2";

    // BERT position embeddings stop at 512; longer inputs are rejected by the engine.
    pub const MAX_SEQUENCE_LENGTH: usize = 512;

    // Floor for the attention-mask sum before dividing (all-padding rows).
    pub const MASK_SUM_MIN: f32 = 1e-9;

    // Floor for the L2 norm before dividing (all-zero pooled rows).
    pub const NORM_MIN: f32 = 1e-12;

    pub const VOCAB_FILE: &str = "vocab.txt";
    pub const CONFIG_FILE: &str = "config.json";
    pub const WEIGHTS_FILE: &str = "model.safetensors";
}

pub mod logging {
    pub const LOG_FILE_NAME: &str = "minilm_embed";

    pub const LOG_ROTATE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
    pub const LOG_ROTATE_KEEP_FILES: usize = 5;
}
