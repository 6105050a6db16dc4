use std::time::Duration;

use log::debug;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::redirect::Policy;
use serde::de::DeserializeOwned;
use url::Url;

use crate::modules::error::{EditorError, EditorResult};
use crate::modules::types::{
    ClearScope, Lists, MoveReply, StatusReply, SummaryData, SummaryRow, Target,
};

/// HTTP contract of the list editor backend.
pub trait Backend {
    fn summary_data(&self) -> EditorResult<Vec<SummaryRow>>;
    /// Pre-rendered summary fragment.
    fn summary_html(&self) -> EditorResult<String>;
    fn log(&self) -> EditorResult<String>;
    fn lists(&self) -> EditorResult<Lists>;
    fn move_domain(&self, domain: &str, target: Target, note: &str) -> EditorResult<MoveReply>;
    fn clear_logs(&self, scope: ClearScope) -> EditorResult<StatusReply>;
    fn reload(&self) -> EditorResult<StatusReply>;
    fn set_setpoint(&self) -> EditorResult<StatusReply>;
    fn clear_setpoint(&self) -> EditorResult<StatusReply>;
    /// Replaces both lists with the given raw texts.
    fn save_lists(&self, whitelist: &str, blacklist: &str) -> EditorResult<()>;
}

pub struct HttpBackend {
    base: Url,
    client: Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> EditorResult<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("listeditor/0.1"));
        let client = Client::builder()
            .default_headers(headers)
            .redirect(Policy::none())
            .timeout(timeout)
            .build()?;

        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> EditorResult<Url> {
        Ok(self.base.join(path)?)
    }

    fn get_text(&self, path: &str) -> EditorResult<String> {
        let url = self.url(path)?;
        debug!("GET {url}");
        Ok(self.client.get(url).send()?.error_for_status()?.text()?)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> EditorResult<T> {
        let url = self.url(path)?;
        debug!("GET {url}");
        read_json(self.client.get(url).send()?)
    }
}

// Error replies carry a JSON body too, so the status code is not checked here.
fn read_json<T: DeserializeOwned>(response: Response) -> EditorResult<T> {
    let status = response.status();
    let body = response.text()?;
    serde_json::from_str(&body).map_err(|err| {
        debug!("unparseable reply ({status}): {body}");
        EditorError::Json(err)
    })
}

impl Backend for HttpBackend {
    fn summary_data(&self) -> EditorResult<Vec<SummaryRow>> {
        let data: SummaryData = self.get_json("summary-data")?;
        Ok(data.rows)
    }

    fn summary_html(&self) -> EditorResult<String> {
        self.get_text("summary")
    }

    fn log(&self) -> EditorResult<String> {
        self.get_text("log")
    }

    fn lists(&self) -> EditorResult<Lists> {
        self.get_json("lists")
    }

    fn move_domain(&self, domain: &str, target: Target, note: &str) -> EditorResult<MoveReply> {
        let url = self.url("move-domain")?;
        let target = target.to_string();
        debug!("POST {url} domain={domain} target={target}");
        let response = self
            .client
            .post(url)
            .form(&[("domain", domain), ("target", target.as_str()), ("note", note)])
            .send()?;
        read_json(response)
    }

    fn clear_logs(&self, scope: ClearScope) -> EditorResult<StatusReply> {
        let url = self.url(scope.path())?;
        debug!("POST {url}");
        read_json(self.client.post(url).send()?)
    }

    fn reload(&self) -> EditorResult<StatusReply> {
        let url = self.url("reload")?;
        debug!("POST {url}");
        read_json(self.client.post(url).send()?)
    }

    fn set_setpoint(&self) -> EditorResult<StatusReply> {
        let url = self.url("setpoint")?;
        debug!("POST {url}");
        read_json(self.client.post(url).send()?)
    }

    fn clear_setpoint(&self) -> EditorResult<StatusReply> {
        let url = self.url("setpoint")?;
        debug!("DELETE {url}");
        read_json(self.client.delete(url).send()?)
    }

    fn save_lists(&self, whitelist: &str, blacklist: &str) -> EditorResult<()> {
        let url = self.url("save")?;
        debug!("POST {url}");
        let response = self
            .client
            .post(url)
            .form(&[("whitelist", whitelist), ("blacklist", blacklist)])
            .send()?;
        // the backend answers a successful save with a redirect to its own page
        let status = response.status();
        if !status.is_success() && !status.is_redirection() {
            let text = response.text()?;
            return Err(EditorError::Backend(format!("{status}: {}", text.trim())));
        }
        Ok(())
    }
}
