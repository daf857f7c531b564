//! Error handling for fork republishing
//!
//! This module provides comprehensive error types with recovery guidance
//! using the thiserror crate for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for fork republishing operations
#[derive(Error, Debug)]
pub enum RepublishError {
    // Configuration errors
    #[error("設定ファイルの読み込みに失敗しました: {path}")]
    ConfigReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("設定ファイルの解析に失敗しました: {path}: {message}")]
    ConfigParseFailed { path: PathBuf, message: String },

    // Workspace errors
    #[error("作業ディレクトリの準備に失敗しました: {path}")]
    WorkspaceSetupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Command execution errors
    #[error("コマンドの実行に失敗しました: {command}")]
    CommandFailed { command: String, message: String },

    // Manifest errors
    #[error("package.jsonの読み込みに失敗しました: {path}")]
    ManifestReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("package.jsonの解析に失敗しました: {message}")]
    ManifestParseFailed { message: String },

    #[error("package.jsonの書き込みに失敗しました: {path}")]
    ManifestWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("無効なパッケージ名です: {name}")]
    InvalidPackageName { name: String, message: String },

    #[error("無効なバージョン番号です: {version}")]
    InvalidVersion { version: String },

    // Documentation errors
    #[error("READMEの更新に失敗しました: {path}")]
    ReadmeUpdateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Registry errors
    #[error("[{package}] レジストリの照会に失敗しました: {message}")]
    RegistryQueryFailed { package: String, message: String },

    // Authentication errors
    #[error("認証トークンが設定されていません（環境変数: {env_var}）")]
    TokenMissing { env_var: String },
}

impl RepublishError {
    /// Check if this error is recoverable by re-running after a fix
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::ManifestParseFailed { .. })
    }

    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::ConfigReadFailed { .. } | Self::ConfigParseFailed { .. } => vec![
                ".republish.ymlの構文を確認してください",
                "設定ファイルを削除するとデフォルト値で実行されます",
            ],
            Self::WorkspaceSetupFailed { .. } => vec![
                "作業ディレクトリへの書き込み権限を確認してください",
                "ディスクの空き容量を確認してください",
            ],
            Self::CommandFailed { .. } => vec![
                "コマンドの出力を確認してください",
                "git / npm がインストールされているか確認してください",
            ],
            Self::ManifestReadFailed { .. } => vec![
                "クローンが成功しているか確認してください",
                "アップストリームのリポジトリ構成を確認してください",
            ],
            Self::ManifestParseFailed { .. } => {
                vec!["アップストリームのpackage.jsonを確認してください"]
            }
            Self::ManifestWriteFailed { .. } | Self::ReadmeUpdateFailed { .. } => {
                vec!["作業ディレクトリへの書き込み権限を確認してください"]
            }
            Self::InvalidPackageName { .. } => {
                vec!["フォーク名がnpmの命名規則に従っているか確認してください"]
            }
            Self::InvalidVersion { .. } => {
                vec!["SemVer形式（例: 1.0.0）で指定してください"]
            }
            Self::RegistryQueryFailed { .. } => vec![
                "ネットワーク接続を確認してください",
                "レジストリのステータスを確認してください",
            ],
            Self::TokenMissing { .. } => {
                vec!["環境変数を設定してください（例: NPM_TOKEN）"]
            }
        }
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigReadFailed { .. } => "CONFIG_READ_FAILED",
            Self::ConfigParseFailed { .. } => "CONFIG_PARSE_FAILED",
            Self::WorkspaceSetupFailed { .. } => "WORKSPACE_SETUP_FAILED",
            Self::CommandFailed { .. } => "COMMAND_FAILED",
            Self::ManifestReadFailed { .. } => "MANIFEST_READ_FAILED",
            Self::ManifestParseFailed { .. } => "MANIFEST_PARSE_FAILED",
            Self::ManifestWriteFailed { .. } => "MANIFEST_WRITE_FAILED",
            Self::InvalidPackageName { .. } => "INVALID_PACKAGE_NAME",
            Self::InvalidVersion { .. } => "INVALID_VERSION",
            Self::ReadmeUpdateFailed { .. } => "README_UPDATE_FAILED",
            Self::RegistryQueryFailed { .. } => "REGISTRY_QUERY_FAILED",
            Self::TokenMissing { .. } => "TOKEN_MISSING",
        }
    }
}
