//! WASM bindings for the shiki drag-and-drop file uploader.
//!
//! ```js
//! const uploader = new JsFileUploader(node, { endpoint: '/api/user_images' }, flash);
//! uploader.on('upload:file:success', (response) => insertImage(response));
//! ```

mod types;
mod uploader;

pub use types::*;
pub use uploader::*;

use wasm_bindgen::prelude::*;

/// Install the panic hook and route `tracing` output to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    console_error_panic_hook::set_once();

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    // A host may already have installed a subscriber.
    let _ = set_global_default(Registry::default().with(wasm_layer));
}
