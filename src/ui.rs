use crate::models::ResolutionTier;
use crate::render::RenderedView;

pub fn render_index(view: &RenderedView) -> String {
    INDEX_HTML
        .replace("{{TIER}}", tier_label(view.tier))
        .replace("{{REVENUE}}", &view.kpi_revenue)
        .replace("{{ORDERS}}", &view.kpi_orders)
        .replace("{{AVERAGE}}", &view.kpi_average)
        .replace("{{NET}}", &view.kpi_net)
        .replace("{{CHART_ID}}", &view.chart.container)
}

fn tier_label(tier: ResolutionTier) -> &'static str {
    match tier {
        ResolutionTier::Primary => "Live store data",
        ResolutionTier::Fallback => "Sample data",
        ResolutionTier::Default => "No data yet",
    }
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Business Insights</title>
  <script src="https://cdn.jsdelivr.net/npm/chart.js@4"></script>
  <style>
    :root {
      --bg: #f4f6fb;
      --ink: #1d2433;
      --muted: #6b7385;
      --card: #ffffff;
      --accent: #4361ee;
      --shadow: 0 12px 32px rgba(29, 36, 51, 0.08);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      padding: 28px 18px 48px;
    }

    main {
      width: min(1100px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 22px;
    }

    header {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 12px;
      flex-wrap: wrap;
    }

    h1 {
      margin: 0;
      font-size: 1.7rem;
    }

    .source {
      color: var(--muted);
      font-size: 0.9rem;
    }

    .controls {
      display: flex;
      gap: 10px;
    }

    select {
      border: 1px solid #d5d9e4;
      border-radius: 10px;
      padding: 8px 12px;
      background: var(--card);
      font: inherit;
    }

    .kpis {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
    }

    .card {
      background: var(--card);
      border-radius: 16px;
      box-shadow: var(--shadow);
      padding: 20px;
    }

    .kpi-label {
      color: var(--muted);
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.06em;
    }

    .kpi-value {
      font-size: 1.6rem;
      font-weight: 600;
      margin-top: 6px;
    }

    .panels {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
      gap: 16px;
    }

    .chart-box {
      position: relative;
      height: 280px;
    }

    .loader {
      position: absolute;
      inset: 0;
      display: none;
      align-items: center;
      justify-content: center;
      color: var(--muted);
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th,
    td {
      padding: 10px 8px;
      border-bottom: 1px solid #eef0f5;
      text-align: left;
    }

    .text-center {
      text-align: center;
    }

    .text-right {
      text-align: right;
    }

    .badge {
      background: rgba(67, 97, 238, 0.12);
      color: var(--accent);
      border-radius: 999px;
      padding: 3px 10px;
      font-size: 0.85rem;
    }

    .metric-item {
      display: flex;
      justify-content: space-between;
      padding: 8px 0;
      border-bottom: 1px dashed #e3e6ee;
    }

    .metric-label {
      color: var(--muted);
    }
  </style>
</head>
<body>
  <main>
    <header>
      <div>
        <h1>Business Insights</h1>
        <div class="source" id="data-source">{{TIER}}</div>
      </div>
      <div class="controls">
        <select id="date-filter" aria-label="Date range">
          <option value="all">All time</option>
          <option value="today">Today</option>
          <option value="7d">Last 7 days</option>
          <option value="30d">Last 30 days</option>
        </select>
        <select id="group-filter" aria-label="Breakdown">
          <option value="payment">By payment method</option>
          <option value="customer">By customer</option>
          <option value="service">By service</option>
        </select>
      </div>
    </header>

    <section class="kpis">
      <div class="card">
        <div class="kpi-label">Total revenue</div>
        <div class="kpi-value" id="kpi-total-revenue">{{REVENUE}}</div>
      </div>
      <div class="card">
        <div class="kpi-label">Orders</div>
        <div class="kpi-value" id="kpi-total-orders">{{ORDERS}}</div>
      </div>
      <div class="card">
        <div class="kpi-label">Average order</div>
        <div class="kpi-value" id="kpi-avg-order">{{AVERAGE}}</div>
      </div>
      <div class="card">
        <div class="kpi-label">Net estimate</div>
        <div class="kpi-value" id="kpi-net-profit">{{NET}}</div>
      </div>
    </section>

    <section class="panels">
      <div class="card">
        <h2>Revenue distribution</h2>
        <div class="chart-box">
          <canvas id="{{CHART_ID}}"></canvas>
          <div class="loader" id="chart-loader">Loading...</div>
        </div>
        <div id="revenue-metrics"></div>
      </div>
      <div class="card">
        <h2>Top performing services</h2>
        <table>
          <thead>
            <tr><th>Service</th><th class="text-center">Orders</th><th class="text-right">Yield</th></tr>
          </thead>
          <tbody id="top-services-body"></tbody>
        </table>
      </div>
    </section>

    <section class="card">
      <h2>Recent orders</h2>
      <table>
        <thead>
          <tr><th>Order</th><th>Customer</th><th>Date</th><th class="text-right">Total</th></tr>
        </thead>
        <tbody id="recent-orders-body"></tbody>
      </table>
    </section>
  </main>

  <script>
    const sourceLabels = {
      primary: 'Live store data',
      fallback: 'Sample data',
      default: 'No data yet'
    };

    const el = (id) => document.getElementById(id);
    const dateFilter = el('date-filter');
    const groupFilter = el('group-filter');
    const loader = el('chart-loader');

    let chart = null;
    let painted = 0;

    const cell = (text, className) => {
      const td = document.createElement('td');
      td.textContent = text;
      if (className) {
        td.className = className;
      }
      return td;
    };

    const fillRows = (body, rows, columns, emptyText) => {
      body.replaceChildren();
      if (!rows.length) {
        const tr = document.createElement('tr');
        const td = cell(emptyText, 'text-center');
        td.colSpan = columns;
        tr.appendChild(td);
        body.appendChild(tr);
        return;
      }
      rows.forEach((cells) => {
        const tr = document.createElement('tr');
        cells.forEach((node) => tr.appendChild(node));
        body.appendChild(tr);
      });
    };

    const renderChart = (spec) => {
      if (chart) {
        chart.destroy();
        chart = null;
      }
      if (typeof Chart === 'undefined') {
        return;
      }
      chart = new Chart(el(spec.container).getContext('2d'), {
        type: spec.kind,
        data: {
          labels: spec.labels,
          datasets: [{
            data: spec.values,
            backgroundColor: ['#4361ee', '#4cc9f0', '#3f37c9', '#7209b7', '#f72585'],
            borderWidth: 2,
            hoverOffset: 4
          }]
        },
        options: {
          responsive: true,
          maintainAspectRatio: false,
          plugins: { legend: { position: 'bottom' } },
          cutout: '70%'
        }
      });
    };

    const paint = (view) => {
      if (view.sequence < painted) {
        return;
      }
      painted = view.sequence;

      el('data-source').textContent = sourceLabels[view.tier] || '';
      el('kpi-total-revenue').textContent = view.kpi_revenue;
      el('kpi-total-orders').textContent = view.kpi_orders;
      el('kpi-avg-order').textContent = view.kpi_average;
      el('kpi-net-profit').textContent = view.kpi_net;

      const serviceRows = view.services.map((service) => {
        const badge = document.createElement('span');
        badge.className = 'badge';
        badge.textContent = service.yield;
        const yieldCell = cell('', 'text-right');
        yieldCell.appendChild(badge);
        return [cell(service.name), cell(service.count, 'text-center'), yieldCell];
      });
      fillRows(el('top-services-body'), serviceRows, 3, view.services_placeholder || 'No data available');

      const recentRows = view.recent_orders.map((order) => [
        cell(order.id),
        cell(order.customer),
        cell(order.date),
        cell(order.total, 'text-right')
      ]);
      fillRows(el('recent-orders-body'), recentRows, 4, 'No orders yet');

      const metrics = el('revenue-metrics');
      metrics.replaceChildren();
      view.metrics.forEach((item) => {
        const row = document.createElement('div');
        row.className = 'metric-item';
        const label = document.createElement('span');
        label.className = 'metric-label';
        label.textContent = item.label;
        const value = document.createElement('span');
        value.className = 'metric-value';
        value.textContent = item.value;
        row.append(label, value);
        metrics.appendChild(row);
      });

      renderChart(view.chart);
    };

    const load = async () => {
      loader.style.display = 'flex';
      try {
        const params = new URLSearchParams({ filter: dateFilter.value, group: groupFilter.value });
        const res = await fetch(`/api/analytics?${params}`);
        if (!res.ok) {
          throw new Error(await res.text());
        }
        paint(await res.json());
      } catch (err) {
        console.error('analytics refresh failed', err);
      } finally {
        loader.style.display = 'none';
      }
    };

    dateFilter.addEventListener('change', load);
    groupFilter.addEventListener('change', load);
    load();
  </script>
</body>
</html>
"#;
