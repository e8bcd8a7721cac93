//! Execution queue tests: FIFO admission, spacing, throttle retry.

#[cfg(test)]
mod tests {
    use crate::piston::PistonClient;
    use crate::queue::ExecQueue;
    use piston_types::ExecRequest;
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tokio::sync::Mutex;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const INTERVAL: Duration = Duration::from_millis(50);

    fn success_body(output: &str) -> serde_json::Value {
        serde_json::json!({
            "language": "rust",
            "version": "1.68.2",
            "run": {"stdout": output, "stderr": "", "output": output, "code": 0, "signal": null}
        })
    }

    fn throttle_body() -> serde_json::Value {
        serde_json::json!({"message": "Requests limited to 5 per second"})
    }

    fn queue(server: &MockServer) -> Arc<ExecQueue> {
        Arc::new(ExecQueue::new(
            PistonClient::new(reqwest::Client::new(), server.uri()),
            INTERVAL,
        ))
    }

    fn request(code: &str) -> ExecRequest {
        ExecRequest::new("rust", code, vec![], "")
    }

    #[tokio::test]
    async fn test_throttled_responses_are_retried_transparently() {
        let server = MockServer::start().await;

        // Three throttle markers, then a real result. The caller must
        // observe only the real result, with four backend calls made.
        Mock::given(method("POST"))
            .and(path("/execute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(throttle_body()))
            .up_to_n_times(3)
            .expect(3)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/execute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("done")))
            .expect(1)
            .mount(&server)
            .await;

        let queue = queue(&server);
        let success = queue.submit(&request("x")).await.unwrap();
        assert_eq!(success.run.output, "done");
    }

    #[tokio::test]
    async fn test_backend_error_is_terminal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/execute"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"message": "runtime is unknown"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let queue = queue(&server);
        let err = queue.submit(&request("x")).await.unwrap_err();
        assert!(err.to_string().contains("runtime is unknown"));
    }

    #[tokio::test]
    async fn test_jobs_complete_in_submission_order_with_spacing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/execute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ok")))
            .expect(3)
            .mount(&server)
            .await;

        let queue = queue(&server);
        let order: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
        let started = Instant::now();

        let mut handles = Vec::new();
        for job in 0..3u32 {
            let queue = queue.clone();
            let order = order.clone();
            handles.push(tokio::spawn(async move {
                queue.submit(&request(&format!("job{job}"))).await.unwrap();
                order.lock().await.push(job);
            }));
            // Stagger spawns so arrival order at the queue is fixed.
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*order.lock().await, vec![0, 1, 2]);
        // Three admitted calls: at least two full spacing intervals.
        assert!(started.elapsed() >= INTERVAL * 2);
    }

    #[tokio::test]
    async fn test_throttled_job_finishes_before_next_job_is_admitted() {
        let server = MockServer::start().await;

        // Job A: two throttles then success. Job B: immediate success.
        Mock::given(method("POST"))
            .and(path("/execute"))
            .and(body_string_contains("jobA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(throttle_body()))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/execute"))
            .and(body_string_contains("jobA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("a")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/execute"))
            .and(body_string_contains("jobB"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("b")))
            .expect(1)
            .mount(&server)
            .await;

        let queue = queue(&server);
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let qa = queue.clone();
        let oa = order.clone();
        let a = tokio::spawn(async move {
            qa.submit(&request("jobA")).await.unwrap();
            oa.lock().await.push("a");
        });
        tokio::time::sleep(Duration::from_millis(5)).await;
        let qb = queue.clone();
        let ob = order.clone();
        let b = tokio::spawn(async move {
            qb.submit(&request("jobB")).await.unwrap();
            ob.lock().await.push("b");
        });

        a.await.unwrap();
        b.await.unwrap();

        // B was submitted while A was being throttled; A's retries must
        // all land before B is admitted.
        assert_eq!(*order.lock().await, vec!["a", "b"]);
    }
}
