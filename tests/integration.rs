//! Integration tests for twoslash-verify
//!
//! These tests run full verification passes against temporary project
//! fixtures using a real TypeScript compiler, so they are gated behind the
//! `integration-tests` feature:
//!
//! ```sh
//! cargo test --features integration-tests
//! ```
//!
//! `tsc` must be available on `PATH`.

mod common;

use anyhow::Result;
use common::ProjectFixture;
use twoslash_verify::verifier::{verify, VerifyOptions};

fn options_for(fixture: &ProjectFixture) -> VerifyOptions {
    VerifyOptions {
        root_dir: fixture.root().to_path_buf(),
        resolve_project: false,
        ..VerifyOptions::default()
    }
}

#[tokio::test]
async fn integration_valid_blocks_verify_cleanly() -> Result<()> {
    let fixture = ProjectFixture::new()?;
    fixture.write_document(
        "valid.md",
        "# Valid\n\n```ts twoslash\nconst answer: number = 42\nconsole.log(answer)\n```\n",
    )?;

    let errors = verify(&options_for(&fixture)).await?;
    assert_eq!(errors, 0);
    Ok(())
}

#[tokio::test]
async fn integration_type_errors_are_detected() -> Result<()> {
    let fixture = ProjectFixture::new()?;
    fixture.write_document(
        "invalid.md",
        "# Invalid\n\n```ts twoslash\nconst answer: string = 42\n```\n",
    )?;

    let errors = verify(&options_for(&fixture)).await?;
    assert_eq!(errors, 1);
    Ok(())
}

#[tokio::test]
async fn integration_out_of_scope_blocks_are_ignored() -> Result<()> {
    let fixture = ProjectFixture::new()?;
    fixture.write_document(
        "mixed.md",
        "# Mixed\n\n```ts\nconst broken: string = 42\n```\n\n\
         ```ts twoslash\nconst fine: number = 1\n```\n",
    )?;

    let errors = verify(&options_for(&fixture)).await?;
    assert_eq!(errors, 0, "only the annotated block should be checked");
    Ok(())
}

#[tokio::test]
async fn integration_empty_content_dir_passes() -> Result<()> {
    let fixture = ProjectFixture::new()?;
    let errors = verify(&options_for(&fixture)).await?;
    assert_eq!(errors, 0);
    Ok(())
}

#[tokio::test]
async fn integration_partial_failure_reports_every_error() -> Result<()> {
    let fixture = ProjectFixture::new()?;
    fixture.write_document(
        "a.md",
        "```ts twoslash\nconst bad: string = 1\n```\n\n```ts twoslash\nconst ok = 2\n```\n",
    )?;
    fixture.write_document("b.md", "```ts twoslash\nconst worse: number = 'x'\n```\n")?;

    let errors = verify(&options_for(&fixture)).await?;
    assert_eq!(errors, 2, "one bad block never hides another");
    Ok(())
}

#[tokio::test]
async fn integration_resolved_project_supplies_ambient_globals() -> Result<()> {
    let fixture = ProjectFixture::new()?;
    fixture.write_build_file(
        "nuxt.d.ts",
        "declare function useRuntimeValue(): { answer: number }\n",
    )?;
    fixture.write_build_file(
        "tsconfig.json",
        r#"{ "compilerOptions": { "strict": true } }"#,
    )?;
    fixture.write_document(
        "ambient.md",
        "```ts twoslash\nconst value = useRuntimeValue()\nconsole.log(value.answer)\n```\n",
    )?;

    let resolved = VerifyOptions {
        root_dir: fixture.root().to_path_buf(),
        resolve_project: true,
        ..VerifyOptions::default()
    };
    let errors = verify(&resolved).await?;
    assert_eq!(errors, 0, "prologue should make the ambient global visible");

    // Without project resolution the same sample cannot see the global.
    let errors = verify(&options_for(&fixture)).await?;
    assert_eq!(errors, 1);
    Ok(())
}

#[tokio::test]
async fn integration_highlight_only_language_passes_without_tsc() -> Result<()> {
    let fixture = ProjectFixture::new()?;
    fixture.write_document(
        "other.md",
        "```python twoslash\nx: int = 'not checked here'\n```\n",
    )?;

    let mut options = options_for(&fixture);
    options.languages = Some("python".to_string());
    let errors = verify(&options).await?;
    assert_eq!(errors, 0);
    Ok(())
}

#[tokio::test]
async fn integration_unknown_language_is_an_error() -> Result<()> {
    let fixture = ProjectFixture::new()?;
    fixture.write_document("unknown.md", "```haskell twoslash\nmain = pure ()\n```\n")?;

    let errors = verify(&options_for(&fixture)).await?;
    assert_eq!(errors, 1);
    Ok(())
}
