use std::fs;
use std::path::PathBuf;

use hr_recruitment::workflows::recruitment::{DivisionId, DivisionRegistry};
use hr_recruitment::workflows::roster::{DivisionRosterImporter, RosterImportError};

fn roster_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "hr-recruitment-{}-{}.csv",
        name,
        std::process::id()
    ));
    fs::write(&path, contents).expect("write roster fixture");
    path
}

#[test]
fn roster_file_seeds_available_slots() {
    let path = roster_file(
        "seed",
        "Division,Name,Capacity,Current Staff\n\
div-finance, Finance ,5,3\n\
div-legal,Legal,2,\n",
    );

    let importer = DivisionRosterImporter::from_path(&path).expect("import succeeds");
    let registry = DivisionRegistry::new();
    importer.seed_registry(&registry).expect("seeds");
    fs::remove_file(&path).ok();

    let finance = registry
        .get(&DivisionId("div-finance".to_string()))
        .expect("finance registered");
    assert_eq!(finance.name, "Finance");
    assert_eq!(finance.available_slots, 2);

    let legal = registry
        .get(&DivisionId("div-legal".to_string()))
        .expect("legal registered");
    assert_eq!(legal.current_staff_count, 0);
    assert_eq!(legal.available_slots, 2);
}

#[test]
fn missing_roster_file_is_an_io_error() {
    let path = std::env::temp_dir().join("hr-recruitment-roster-does-not-exist.csv");
    let err = DivisionRosterImporter::from_path(&path).expect_err("file absent");
    assert!(matches!(err, RosterImportError::Io(_)));
    assert!(err.to_string().starts_with("failed to read division roster"));
}

#[test]
fn malformed_rows_abort_the_whole_import() {
    let path = roster_file(
        "malformed",
        "Division,Name,Capacity,Current Staff\n\
div-finance,Finance,5,3\n\
div-it,IT,lots,1\n",
    );

    let result = DivisionRosterImporter::from_path(&path);
    fs::remove_file(&path).ok();

    assert!(matches!(result, Err(RosterImportError::Csv(_))));
}
