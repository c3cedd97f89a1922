//! Shared fixtures: a project root with build manifests on disk.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const CLIENT_MANIFEST: &str = r#"{
  "pages/index.page.client.js": {
    "file": "assets/index.page.client.a1b2.js",
    "src": "pages/index.page.client.js",
    "isEntry": true,
    "imports": ["_vendor.c3d4.js"],
    "dynamicImports": ["pages/lazy.js"],
    "css": ["assets/index.page.client.e5f6.css"]
  },
  "_vendor.c3d4.js": {
    "file": "assets/vendor.c3d4.js",
    "imports": ["_shared.9999.js"],
    "assets": ["assets/inter.7777.woff2"]
  },
  "_shared.9999.js": {
    "file": "assets/shared.9999.js",
    "imports": ["_vendor.c3d4.js"],
    "css": ["assets/index.page.client.e5f6.css"],
    "assets": ["assets/logo.8888.svg"]
  },
  "pages/lazy.js": {
    "file": "assets/lazy.0000.js",
    "isDynamicEntry": true
  }
}"#;

pub const SERVER_MANIFEST: &str = r#"{
  "pages/index.page.js": {
    "file": "pages/index.page.js",
    "src": "pages/index.page.js",
    "isEntry": true,
    "css": ["assets/index.page.1234.css", "assets/index.page.client.e5f6.css"],
    "imports": ["_react.5555.js"]
  },
  "_react.5555.js": {
    "file": "react.5555.js",
    "assets": ["assets/hero.4321.png"]
  }
}"#;

/// A temporary project root. Manifests are written on demand.
pub struct Project {
    pub dir: tempfile::TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    /// A project with both manifests built.
    pub fn built() -> Self {
        let project = Self::new();
        project.write_client_manifest(CLIENT_MANIFEST);
        project.write_server_manifest(SERVER_MANIFEST);
        project
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    pub fn client_manifest_path(&self) -> PathBuf {
        self.path("dist/client/manifest.json")
    }

    pub fn server_manifest_path(&self) -> PathBuf {
        self.path("dist/server/manifest.json")
    }

    pub fn write_client_manifest(&self, json: &str) {
        write(&self.client_manifest_path(), json);
    }

    pub fn write_server_manifest(&self, json: &str) {
        write(&self.server_manifest_path(), json);
    }
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).expect("Failed to create manifest dir");
    fs::write(path, contents).expect("Failed to write manifest");
}
