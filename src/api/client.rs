use std::collections::HashSet;

use anyhow::Context;
use reqwest::{Client, RequestBuilder};

use super::{Listing, Post, PostMeta};
use crate::outcome::{Outcome, SkipReason};
use crate::Config;

pub struct BlogClient {
    client: Client,
    url: String,
    token: String,
}

impl BlogClient {
    pub fn from_config(config: &Config) -> Self {
        Self::new(Client::new(), &config.api_url, &config.api_token)
    }

    pub fn new(client: Client, url: &str, token: &str) -> Self {
        let mut url = url.trim().to_string();
        if !url.ends_with('/') {
            url.push('/');
        }
        Self {
            client,
            url,
            token: token.to_string(),
        }
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.client
            .get(url)
            .header("Authorization", format!("Token {}", &self.token))
    }

    /// `GET <url><id>/`. A post without content is skipped.
    pub async fn fetch_post(&self, id: &str) -> Outcome<Post> {
        let response = self
            .get(&format!("{}{}/", self.url, id))
            .send()
            .await
            .map_err(|e| SkipReason::Request(e.to_string()))?;

        if response.status() != 200 {
            return Err(SkipReason::Status(response.status().as_u16()));
        }

        let post: Post = response
            .json()
            .await
            .map_err(|e| SkipReason::Request(e.to_string()))?;

        match post.content.as_deref() {
            Some(content) if !content.trim().is_empty() => Ok(post),
            _ => Err(SkipReason::NoContent),
        }
    }

    /// Every record of the list endpoint, following `next` links when the
    /// endpoint paginates.
    pub async fn fetch_all(&self) -> anyhow::Result<Vec<PostMeta>> {
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(self.url.clone());

        while let Some(url) = next.take() {
            if !seen.insert(url.clone()) {
                log::warn!("Pagination loops back to {}, stopping", url);
                break;
            }

            let response = self
                .get(&url)
                .send()
                .await
                .with_context(|| format!("Failed to send request to {}", url))?;

            if !response.status().is_success() {
                return Err(anyhow::anyhow!(
                    "Request to {} failed: {}",
                    url,
                    response.status()
                ));
            }

            let listing: Listing = response
                .json()
                .await
                .with_context(|| format!("Failed to parse listing from {}", url))?;

            match listing {
                Listing::Plain(items) => records.extend(items),
                Listing::Page { results, next: link } => {
                    log::debug!("Fetched page {} ({} records)", url, results.len());
                    records.extend(results);
                    next = link.filter(|link| !link.is_empty());
                }
            }
        }

        Ok(records)
    }
}
