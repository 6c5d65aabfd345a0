//! テスト用ユーティリティ
//!
//! 複数のテストモジュールで使用される
//! `ResourceFetcher` のスタブを提供します。
#![cfg(test)]
#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{
    Arc,
    Mutex,
};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::Semaphore;

use crate::fetch::{
    FetchError,
    ResourceFetcher,
};

/// スタブが返すレスポンス
#[derive(Debug, Clone)]
enum StubResponse {
    /// 本文を返す
    Body(String),
    /// ステータスエラーを返す
    Status(u16),
}

/// メモリ上のレスポンスを返す `ResourceFetcher`
///
/// パスごとの呼び出し回数を記録し、ゲートを設定したパスは
/// `release` が呼ばれるまで応答を保留します。
#[derive(Debug, Default)]
pub(crate) struct StubFetcher {
    /// パス → レスポンス
    responses: Mutex<HashMap<String, StubResponse>>,
    /// パス → 呼び出し回数
    counts: Mutex<HashMap<String, usize>>,
    /// パス → 応答を保留するゲート
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl StubFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// `path` に本文を登録する
    pub(crate) fn insert(&self, path: &str, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), StubResponse::Body(body.to_string()));
    }

    /// `path` をステータスエラーにする
    pub(crate) fn fail_with_status(&self, path: &str, status: u16) {
        self.responses.lock().unwrap().insert(path.to_string(), StubResponse::Status(status));
    }

    /// `path` の応答を `release` まで保留する
    pub(crate) fn gate(&self, path: &str) {
        self.gates.lock().unwrap().insert(path.to_string(), Arc::new(Semaphore::new(0)));
    }

    /// 保留中の `path` の応答を 1 件解放する
    pub(crate) fn release(&self, path: &str) {
        if let Some(gate) = self.gates.lock().unwrap().get(path) {
            gate.add_permits(1);
        }
    }

    /// `path` が取得された回数
    pub(crate) fn fetch_count(&self, path: &str) -> usize {
        self.counts.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    /// 全パスの取得回数の合計
    pub(crate) fn total_fetches(&self) -> usize {
        self.counts.lock().unwrap().values().sum()
    }
}

impl ResourceFetcher for StubFetcher {
    fn fetch<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<String, FetchError>> {
        async move {
            *self.counts.lock().unwrap().entry(path.to_string()).or_default() += 1;

            let gate = self.gates.lock().unwrap().get(path).cloned();
            if let Some(gate) = gate {
                gate.acquire().await.unwrap().forget();
            }

            let response = self.responses.lock().unwrap().get(path).cloned();
            match response {
                Some(StubResponse::Body(body)) => Ok(body),
                Some(StubResponse::Status(status)) => {
                    Err(FetchError::Status { path: path.to_string(), status })
                }
                None => Err(FetchError::NotFound(path.to_string())),
            }
        }
        .boxed()
    }
}
