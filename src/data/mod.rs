use log::warn;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Largest number of input variables (and pooled constants) a dataset may declare.
pub const MAX_VARIABLES: usize = 256;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read dataset file: {0}")]
    FileReadError(#[from] std::io::Error),
    #[error("Dataset file is empty")]
    EmptyFile,
    #[error("Malformed dataset header: {reason}")]
    MalformedHeader { reason: String },
    #[error("Dataset must declare at least one fitness case, got {count}")]
    InvalidCaseCount { count: usize },
    #[error("Dataset declares {count} entries, the maximum is {max}")]
    TooManyVariables { count: usize, max: usize },
    #[error("Invalid random constant range [{min}, {max}]")]
    InvalidConstantRange { min: f64, max: f64 },
    #[error("Invalid number '{token}' on line {line}")]
    InvalidNumber { line: usize, token: String },
    #[error("Line {line} holds {found} values, expected {expected}")]
    RowArity {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Header declares {expected} fitness cases but the file holds {found}")]
    CaseCountMismatch { expected: usize, found: usize },
}

/// One (inputs, target) pair the evolved programs are scored against.
#[derive(Debug, Clone, PartialEq)]
pub struct FitnessCase {
    pub inputs: Vec<f64>,
    pub target: f64,
}

/// Parsed fitness cases plus the bounds used when generating random constants.
///
/// Immutable once loaded, so one `Dataset` can back any number of engines.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    cases: Vec<FitnessCase>,
    variable_count: usize,
    random_min: f64,
    random_max: f64,
    /// Size of the fixed constant pool declared by the five-field header.
    /// Zero means constants are drawn fresh from the range.
    constant_pool_size: usize,
}

impl Dataset {
    /// Builds a dataset from already parsed cases, enforcing the same rules as the file loader.
    pub fn new(
        cases: Vec<FitnessCase>,
        variable_count: usize,
        random_min: f64,
        random_max: f64,
    ) -> Result<Self, DatasetError> {
        Self::with_constant_pool(cases, variable_count, random_min, random_max, 0)
    }

    /// Same as [`Dataset::new`] but declares a fixed pool of `constant_pool_size` constants.
    pub fn with_constant_pool(
        cases: Vec<FitnessCase>,
        variable_count: usize,
        random_min: f64,
        random_max: f64,
        constant_pool_size: usize,
    ) -> Result<Self, DatasetError> {
        validate_header(variable_count, constant_pool_size, random_min, random_max, cases.len())?;
        for (i, case) in cases.iter().enumerate() {
            if case.inputs.len() != variable_count {
                return Err(DatasetError::RowArity {
                    line: i + 2,
                    expected: variable_count + 1,
                    found: case.inputs.len() + 1,
                });
            }
        }
        Ok(Self {
            cases,
            variable_count,
            random_min,
            random_max,
            constant_pool_size,
        })
    }

    pub fn cases(&self) -> &[FitnessCase] {
        &self.cases
    }

    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    pub fn random_min(&self) -> f64 {
        self.random_min
    }

    pub fn random_max(&self) -> f64 {
        self.random_max
    }

    pub fn constant_pool_size(&self) -> usize {
        self.constant_pool_size
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Header fields shared by both accepted layouts.
struct Header {
    variable_count: usize,
    constant_pool_size: usize,
    random_min: f64,
    random_max: f64,
    case_count: usize,
}

fn validate_header(
    variable_count: usize,
    constant_pool_size: usize,
    random_min: f64,
    random_max: f64,
    case_count: usize,
) -> Result<(), DatasetError> {
    if variable_count > MAX_VARIABLES {
        return Err(DatasetError::TooManyVariables {
            count: variable_count,
            max: MAX_VARIABLES,
        });
    }
    if constant_pool_size > MAX_VARIABLES {
        return Err(DatasetError::TooManyVariables {
            count: constant_pool_size,
            max: MAX_VARIABLES,
        });
    }
    // The width itself must be finite for constants to be drawn uniformly
    if !(random_min <= random_max && (random_max - random_min).is_finite()) {
        return Err(DatasetError::InvalidConstantRange {
            min: random_min,
            max: random_max,
        });
    }
    if case_count == 0 {
        return Err(DatasetError::InvalidCaseCount { count: case_count });
    }
    Ok(())
}

fn parse_number(token: &str, line: usize) -> Result<f64, DatasetError> {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(DatasetError::InvalidNumber {
            line,
            token: token.to_string(),
        }),
    }
}

fn parse_count(token: &str, field: &str) -> Result<usize, DatasetError> {
    token.parse::<usize>().map_err(|_| DatasetError::MalformedHeader {
        reason: format!("{} must be a non-negative integer, got '{}'", field, token),
    })
}

/// Parses the first line, either
/// `variable_count random_min random_max case_count` or
/// `variable_count constant_count random_min random_max case_count`.
fn parse_header(line: &str) -> Result<Header, DatasetError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let header = match tokens.as_slice() {
        [vars, min, max, count] => Header {
            variable_count: parse_count(vars, "variable_count")?,
            constant_pool_size: 0,
            random_min: parse_number(min, 1)?,
            random_max: parse_number(max, 1)?,
            case_count: parse_count(count, "fitness_case_count")?,
        },
        [vars, consts, min, max, count] => Header {
            variable_count: parse_count(vars, "variable_count")?,
            constant_pool_size: parse_count(consts, "constant_count")?,
            random_min: parse_number(min, 1)?,
            random_max: parse_number(max, 1)?,
            case_count: parse_count(count, "fitness_case_count")?,
        },
        _ => {
            return Err(DatasetError::MalformedHeader {
                reason: format!("expected 4 or 5 fields, found {}", tokens.len()),
            })
        }
    };
    validate_header(
        header.variable_count,
        header.constant_pool_size,
        header.random_min,
        header.random_max,
        header.case_count,
    )?;
    Ok(header)
}

/// Parses dataset text. Blank lines are skipped; every other line after the
/// header must be one fitness case.
pub fn parse_dataset(content: &str) -> Result<Dataset, DatasetError> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (_, header_line) = lines.next().ok_or(DatasetError::EmptyFile)?;
    let header = parse_header(header_line)?;
    if header.variable_count == 0 {
        warn!("Dataset declares no variables, programs will be built from constants only");
    }

    let expected = header.variable_count + 1;
    let mut cases = Vec::with_capacity(header.case_count);
    for (line_no, line) in lines {
        if cases.len() == header.case_count {
            return Err(DatasetError::CaseCountMismatch {
                expected: header.case_count,
                found: cases.len() + 1,
            });
        }
        let values = line
            .split_whitespace()
            .map(|token| parse_number(token, line_no))
            .collect::<Result<Vec<f64>, _>>()?;
        match values.split_last() {
            Some((&target, inputs)) if values.len() == expected => cases.push(FitnessCase {
                inputs: inputs.to_vec(),
                target,
            }),
            _ => {
                return Err(DatasetError::RowArity {
                    line: line_no,
                    expected,
                    found: values.len(),
                })
            }
        }
    }

    if cases.len() != header.case_count {
        return Err(DatasetError::CaseCountMismatch {
            expected: header.case_count,
            found: cases.len(),
        });
    }

    Ok(Dataset {
        cases,
        variable_count: header.variable_count,
        random_min: header.random_min,
        random_max: header.random_max,
        constant_pool_size: header.constant_pool_size,
    })
}

/// Loads a dataset file. Nothing partial is returned on error.
pub fn load_dataset(file_path: &Path) -> Result<Dataset, DatasetError> {
    let content = fs::read_to_string(file_path)?;
    parse_dataset(&content)
}
