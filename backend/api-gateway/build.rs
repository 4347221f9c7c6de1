fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The gateway only calls the services, so no server stubs are generated.
    // Messages derive Serialize so handlers can return them as JSON.
    println!("cargo:rerun-if-changed=../proto");

    tonic_build::configure()
        .build_server(false)
        .build_client(true)
        .type_attribute(".social", "#[derive(serde::Serialize)]")
        .compile_protos(
            &[
                "../proto/users.proto",
                "../proto/posts.proto",
                "../proto/groups.proto",
                "../proto/friends.proto",
            ],
            &["../proto"],
        )?;
    Ok(())
}
