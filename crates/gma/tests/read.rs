use gma::GmaArchive;
use miette::{miette, IntoDiagnostic, Result};
use std::path::Path;
use std::{fs::File, io::Read};
use tracing::info;
use tracing_test::traced_test;
use walkdir::WalkDir;

fn validate_gma(path: &Path) -> Result<()> {
    info!("testing {}", &path.display());

    let parent_dir = &path
        .parent()
        .ok_or(miette!("unable to find parent"))?
        .join(
            path.file_stem()
                .ok_or(miette!("unable to create file stem"))?,
        );

    info!("comparing to files in {}", parent_dir.display());

    let expected_files = WalkDir::new(parent_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| !e.file_type().is_dir())
        .collect::<Vec<_>>();

    let gma = GmaArchive::new(File::open(path).into_diagnostic()?)?;
    assert_eq!(gma.len(), expected_files.len());

    for entry in gma.entries() {
        let p = parent_dir.join(entry.name());
        info!("comparing to {}", p.display());

        let mut expected = Vec::new();
        File::open(&p)
            .into_diagnostic()?
            .read_to_end(&mut expected)
            .into_diagnostic()?;

        assert_eq!(expected.len() as u64, entry.size());
        assert_eq!(expected, entry.content());
    }

    Ok(())
}

#[traced_test]
#[test]
fn validate_gma_parsing() -> Result<()> {
    let to_test = std::fs::read_dir(format!("{}/resources/", env!("CARGO_MANIFEST_DIR")))
        .into_diagnostic()?
        // Filter out all those directory entries which couldn't be read
        .filter_map(|res| res.ok())
        // Map the directory entries to paths
        .map(|dir_entry| dir_entry.path())
        .filter(|e| e.is_file())
        .filter(|path| path.extension().map_or(false, |ext| ext == "gma"));

    for path in to_test {
        validate_gma(&path)?;
    }

    Ok(())
}

#[traced_test]
#[test]
fn read_fixture_metadata() -> Result<()> {
    let path = format!("{}/resources/simple.gma", env!("CARGO_MANIFEST_DIR"));
    let gma = GmaArchive::new(File::open(path).into_diagnostic()?)?;

    let metadata = gma.metadata();
    assert_eq!(metadata.name, "simple");
    assert_eq!(metadata.author, "gma-rs");
    assert_eq!(metadata.steam_id, 76561197960265728);
    assert_eq!(metadata.timestamp, 1700000000);
    assert_eq!(metadata.required_content, 0);
    assert!(metadata.description.starts_with("{\"title\":\"simple\""));

    assert_eq!(
        gma.file_names().collect::<Vec<_>>(),
        vec![
            "lua/autorun/test.lua",
            "lua/autorun/server/init.lua",
            "materials/gma/readme.txt",
            "materials/gma/empty.txt",
        ]
    );
    assert_eq!(gma.by_name("lua/autorun/test.lua")?.content(), b"print('hi')");
    assert_eq!(gma.by_name("materials/gma/empty.txt")?.size(), 0);

    Ok(())
}
