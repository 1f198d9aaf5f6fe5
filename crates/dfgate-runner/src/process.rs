#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to run `{program}` (is it installed and on PATH?)")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("command failed: {program} {args:?} ({})\n{stderr}", describe_code(*code))]
    CommandFailed {
        program: String,
        args: Vec<String>,
        code: Option<i32>,
        stderr: String,
    },

    #[error("`{program}` output was not valid UTF-8")]
    InvalidUtf8 {
        program: String,
        source: std::string::FromUtf8Error,
    },

    #[error("failed to forward output of `{program}`")]
    Stream {
        program: String,
        source: std::io::Error,
    },
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "terminated by signal".to_owned(),
    }
}
