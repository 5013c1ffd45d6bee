//! Status endpoint URL templates
//!
//! One function per endpoint the monitor reads. Ids on the [`JobTarget`]
//! carry no prefix, so `job_` and `application_` are added here.

use mrmon_core::domain::job::JobTarget;
use mrmon_core::domain::task::TaskKind;

// =============================================================================
// Current generation (resource manager proxy + history server)
// =============================================================================

/// Job document through the resource manager's application proxy
pub fn proxy_job_url(target: &JobTarget) -> String {
    format!(
        "http://{}:{}/proxy/application_{}/ws/v1/mapreduce/jobs/job_{}",
        target.host, target.rm_port, target.app_id, target.job_id
    )
}

/// Task list through the resource manager's application proxy
pub fn proxy_tasks_url(target: &JobTarget) -> String {
    format!("{}/tasks/", proxy_job_url(target))
}

/// Job document from the history server, for jobs the RM no longer serves
pub fn history_job_url(target: &JobTarget) -> String {
    format!(
        "http://{}:{}/ws/v1/history/mapreduce/jobs/job_{}",
        target.host, target.history_port, target.job_id
    )
}

/// Task list from the history server
pub fn history_tasks_url(target: &JobTarget) -> String {
    format!("{}/tasks/", history_job_url(target))
}

// =============================================================================
// Legacy generation (JobTracker JSP pages)
// =============================================================================

/// Legacy job detail page
pub fn legacy_job_url(target: &JobTarget) -> String {
    format!(
        "http://{}:{}/jobdetails.jsp?format=json&jobid=job_{}",
        target.host, target.rm_port, target.job_id
    )
}

/// One page of the legacy task listing for one task kind (pages start at 1)
pub fn legacy_tasks_url(target: &JobTarget, kind: TaskKind, page: usize) -> String {
    format!(
        "http://{}:{}/jobtasks.jsp?type={}&format=json&jobid=job_{}&pagenum={}",
        target.host,
        target.rm_port,
        kind.as_str(),
        target.job_id,
        page
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrmon_core::domain::job::Generation;

    fn target() -> JobTarget {
        JobTarget {
            job_id: "1400000000000_0001".to_string(),
            app_id: "1400000000000_0001".to_string(),
            generation: Generation::Current,
            host: "h".to_string(),
            rm_port: 8088,
            history_port: 19888,
        }
    }

    #[test]
    fn test_current_generation_urls() {
        let target = target();
        assert_eq!(
            proxy_job_url(&target),
            "http://h:8088/proxy/application_1400000000000_0001/ws/v1/mapreduce/jobs/job_1400000000000_0001"
        );
        assert_eq!(
            proxy_tasks_url(&target),
            "http://h:8088/proxy/application_1400000000000_0001/ws/v1/mapreduce/jobs/job_1400000000000_0001/tasks/"
        );
        assert_eq!(
            history_job_url(&target),
            "http://h:19888/ws/v1/history/mapreduce/jobs/job_1400000000000_0001"
        );
        assert_eq!(
            history_tasks_url(&target),
            "http://h:19888/ws/v1/history/mapreduce/jobs/job_1400000000000_0001/tasks/"
        );
    }

    #[test]
    fn test_legacy_urls() {
        let target = JobTarget {
            generation: Generation::Legacy,
            rm_port: 50030,
            ..target()
        };
        assert_eq!(
            legacy_job_url(&target),
            "http://h:50030/jobdetails.jsp?format=json&jobid=job_1400000000000_0001"
        );
        assert_eq!(
            legacy_tasks_url(&target, TaskKind::Reduce, 3),
            "http://h:50030/jobtasks.jsp?type=reduce&format=json&jobid=job_1400000000000_0001&pagenum=3"
        );
    }
}
