use std::fmt;
use std::str::FromStr;

use crate::error::RunnerError;

/// Languages accepted by the sandbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    C,
    Cpp,
    JavaScript,
    Java,
}

impl Language {
    pub const ALL: [Self; 5] = [Self::Python, Self::C, Self::Cpp, Self::JavaScript, Self::Java];

    /// Judge0 runtime identifier.
    #[must_use]
    pub const fn runtime_id(&self) -> u32 {
        match self {
            Self::Python => 71,
            Self::Cpp => 54,
            Self::C => 50,
            Self::JavaScript => 63,
            Self::Java => 62,
        }
    }

    /// Value used in commands and forms.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::JavaScript => "javascript",
            Self::Java => "java",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Python => "Python",
            Self::C => "C",
            Self::Cpp => "C++",
            Self::JavaScript => "JavaScript",
            Self::Java => "Java",
        }
    }

    /// Extra guidance shown on the submission form.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Java => Some("Please use 'Main' as the class name for Java."),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "python" => Ok(Self::Python),
            "c" => Ok(Self::C),
            "cpp" | "c++" => Ok(Self::Cpp),
            "javascript" | "js" => Ok(Self::JavaScript),
            "java" => Ok(Self::Java),
            other => Err(RunnerError::UnsupportedLanguage(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_ids_match_sandbox_contract() {
        let ids: Vec<(&str, u32)> = Language::ALL.iter().map(|l| (l.as_str(), l.runtime_id())).collect();
        assert_eq!(
            ids,
            vec![("python", 71), ("c", 50), ("cpp", 54), ("javascript", 63), ("java", 62)]
        );
    }

    #[test]
    fn parses_choice_values() {
        assert_eq!("Python".parse::<Language>().unwrap(), Language::Python);
        assert_eq!("c++".parse::<Language>().unwrap(), Language::Cpp);
        assert!(matches!("rust".parse::<Language>(), Err(RunnerError::UnsupportedLanguage(_))));
    }
}
