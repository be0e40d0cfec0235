//! Model Registry - Available models for download

use super::types::DownloadableModel;

/// Name of the model shipped with the app as a bundled asset
pub const DEFAULT_MODEL: &str = "gemma-2b-it-cpu-int4.task";

/// Get list of available models for download
pub fn model_store() -> Vec<DownloadableModel> {
    // Curated list of on-device models
    vec![
        DownloadableModel {
            name: "gemma-2b-it-cpu-int4.task".to_string(),
            description: "Gemma 2B is a lightweight, state-of-the-art open model from Google. This is a 4-bit quantized version for CPU.".to_string(),
            url: "https://storage.googleapis.com/mediapipe-models/genai_llminference_task/gemma_2b_it_cpu_int4.task".to_string(),
            size: "1.4 GB".to_string(),
        },
        DownloadableModel {
            name: "phi-2-cpu-int4.task".to_string(),
            description: "Phi-2 is a small, powerful model from Microsoft, ideal for various tasks. This is a 4-bit quantized version for CPU.".to_string(),
            url: "https://storage.googleapis.com/mediapipe-models/genai_llminference_task/phi_2_cpu_int4.task".to_string(),
            size: "1.6 GB".to_string(),
        },
        DownloadableModel {
            name: "gemma-1b-it-cpu-int4.task".to_string(),
            description: "The lightest Gemma model (1B parameters), optimized for the smallest memory footprint on mobile CPUs.".to_string(),
            url: "https://storage.googleapis.com/mediapipe-models/genai_llminference_task/gemma_1b_it_cpu_int4.task".to_string(),
            size: "0.7 GB".to_string(),
        },
        DownloadableModel {
            name: "gemma-7b-it-gpu-int8.task".to_string(),
            description: "A powerful Gemma 7B instruction-tuned model, 8-bit quantized for better performance on mobile GPUs.".to_string(),
            url: "https://storage.googleapis.com/mediapipe-models/genai_llminference_task/gemma_7b_it_gpu_int8.task".to_string(),
            size: "7.8 GB".to_string(),
        },
    ]
}

/// Look up a catalog entry by name
pub fn find_model(name: &str) -> Option<DownloadableModel> {
    model_store().into_iter().find(|m| m.name == name)
}
