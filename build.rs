use shadow_rs::ShadowBuilder;

fn main() {
    // Generate build metadata for version information using shadow-rs
    ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build metadata");
}
