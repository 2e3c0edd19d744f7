#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

pub const NPS_JAN: &str = "source,buyer,reason,comment,sentiment,user_id\n\
app,B1,Price,Too expensive,negative,00123\n\
web,B2,Delivery,Arrived late,negative,00456\n\
app,B3,Price,,positive,00789\n";

pub const NPS_FEB: &str = "source,buyer,reason,comment,channel\n\
app,B4,Quality,Great quality,email\n\
web,B5,Price,Too expensive,sms\n";

pub const PLAY_STORE: &str = "id,sentiment,user,reason,reason2,comment,ratingmeaning,rating,reviewer_type\n\
p1,negative,u1,App,Crash on login,Keeps crashing,Bad,1,new\n\
p2,positive,u2,App,Fast search,Love it,Good,5,returning\n\
p3,neutral,u3,App,Crash on login,Crashes sometimes,Okay,n/a,new\n";

pub const SELLER_JAN: &str = "fk_glusr_buyer_id,iil_glusr_seller_id,feedback_date,reason,reason2,comment\n\
000981,44120,2024-01-03,Relevance,Wrong category,Seller sells shoes\n\
000982,44121,2024-01-04,Relevance,Out of area,Too far away\n";

pub const SELLER_QTR: &str = "quarter,responses,relevant_pct\nQ1,120,81\nQ2,140,84\n";

/// Scratch directory acting as a local file store.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, contents).expect("write temp file contents");
        path
    }
}

/// Encodes text as windows-1252 bytes.
pub fn latin1_bytes(text: &str) -> Vec<u8> {
    let (bytes, _, had_errors) = encoding_rs::WINDOWS_1252.encode(text);
    assert!(!had_errors, "text not representable in windows-1252");
    bytes.into_owned()
}
