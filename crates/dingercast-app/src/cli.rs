// Command-line arguments: `dingercast [MODEL|all] [--distribution]`.

use dingercast_core::ModelKind;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CliError {
    #[error("unknown model '{0}' (expected one of: all, basic, home_away, pitcher_handedness, ballpark_factors, advanced_combined)")]
    UnknownModel(String),

    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub models: Vec<ModelKind>,
    pub include_distribution: bool,
}

impl CliArgs {
    /// Parse arguments after the program name.
    pub fn parse<I, S>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut models: Option<Vec<ModelKind>> = None;
        let mut include_distribution = false;

        for arg in args {
            let arg = arg.as_ref();
            match arg {
                "--distribution" | "-d" => include_distribution = true,
                _ if arg.starts_with('-') => {
                    return Err(CliError::UnexpectedArgument(arg.to_string()))
                }
                _ if models.is_some() => {
                    return Err(CliError::UnexpectedArgument(arg.to_string()))
                }
                "all" => models = Some(ModelKind::ALL.to_vec()),
                name => {
                    let kind = name
                        .parse::<ModelKind>()
                        .map_err(|_| CliError::UnknownModel(name.to_string()))?;
                    models = Some(vec![kind]);
                }
            }
        }

        Ok(CliArgs {
            models: models.unwrap_or_else(|| ModelKind::ALL.to_vec()),
            include_distribution,
        })
    }
}
